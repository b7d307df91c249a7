//! Universe client: retrieves S&P 500 constituents and per-security
//! attributes, and snapshots the universe to CSV for offline runs.

use anyhow::{Context, Result};
use backoff::ExponentialBackoff;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use rust_decimal::Decimal;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::SecurityRecord;

use super::types::{ConstituentRow, QuoteSummaryEnvelope, QuoteSummaryResult, RawValue};

const QUOTE_API_BASE: &str = "https://query1.finance.yahoo.com";
const CONSTITUENTS_URL: &str =
    "https://datahub.io/core/s-and-p-500-companies/r/constituents.csv";
const QUOTE_MODULES: &str =
    "assetProfile,price,summaryDetail,defaultKeyStatistics,financialData";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// In-flight quote requests during a universe fetch.
const FETCH_CONCURRENCY: usize = 8;

/// Client for the constituents and quote-summary endpoints.
pub struct UniverseClient {
    client: Client,
    quote_base_url: String,
    constituents_url: String,
}

impl UniverseClient {
    /// Create a new universe client with default settings.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            quote_base_url: QUOTE_API_BASE.to_string(),
            constituents_url: CONSTITUENTS_URL.to_string(),
        })
    }

    /// Create with custom base URLs (for testing).
    pub fn with_base_urls(quote_base_url: String, constituents_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            quote_base_url,
            constituents_url,
        })
    }

    /// Fetch the constituents list and return its ticker symbols.
    pub async fn constituents(&self) -> Result<Vec<String>> {
        debug!(url = %self.constituents_url, "Fetching constituents");

        let response = self.get_with_retry(&self.constituents_url).await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Constituents request failed: {} - {}", status, body);
        }

        let body = response
            .text()
            .await
            .context("Failed to read constituents response")?;

        let mut reader = csv::Reader::from_reader(body.as_bytes());
        let mut tickers = Vec::new();
        for row in reader.deserialize::<ConstituentRow>() {
            let row = row.context("Failed to parse constituents CSV")?;
            tickers.push(row.symbol);
        }

        Ok(tickers)
    }

    /// Fetch quote-summary attributes for one ticker.
    ///
    /// Returns `None` when the record lacks a sector or a positive price;
    /// such records never reach the pipeline.
    pub async fn quote_summary(&self, ticker: &str) -> Result<Option<SecurityRecord>> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}",
            self.quote_base_url, ticker, QUOTE_MODULES
        );

        debug!(url = %url, "Fetching quote summary");

        let response = self.get_with_retry(&url).await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Quote summary request failed: {} - {}", status, body);
        }

        let envelope: QuoteSummaryEnvelope = response
            .json()
            .await
            .context("Failed to parse quote summary response")?;

        let Some(result) = envelope.quote_summary.result.into_iter().next() else {
            return Ok(None);
        };

        Ok(record_from_summary(ticker, result))
    }

    /// Fetch the whole universe: constituents, then quote summaries with
    /// bounded concurrency. Per-ticker failures are logged and skipped.
    /// Records come back in ascending ticker order.
    pub async fn fetch_universe(&self, limit: Option<usize>) -> Result<Vec<SecurityRecord>> {
        let mut tickers = self.constituents().await?;
        if let Some(limit) = limit {
            tickers.truncate(limit);
        }

        let mut records: Vec<SecurityRecord> = stream::iter(tickers)
            .map(|ticker| async move {
                match self.quote_summary(&ticker).await {
                    Ok(Some(record)) => Some(record),
                    Ok(None) => {
                        debug!(ticker = %ticker, "record lacks sector or price, dropped");
                        None
                    }
                    Err(e) => {
                        warn!(ticker = %ticker, error = %e, "quote fetch failed, skipping");
                        None
                    }
                }
            })
            .buffer_unordered(FETCH_CONCURRENCY)
            .filter_map(|record| async move { record })
            .collect()
            .await;

        records.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        Ok(records)
    }

    /// GET with exponential backoff on connection errors and transient
    /// HTTP statuses.
    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let policy = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(60)),
            ..Default::default()
        };

        backoff::future::retry(policy, || async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(anyhow::Error::new(e)))?;

            let status = response.status();
            if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(backoff::Error::transient(anyhow::anyhow!(
                    "transient status {status} from {url}"
                )));
            }

            Ok(response)
        })
        .await
    }
}

/// Map a quote-summary result into a [`SecurityRecord`].
///
/// Returns `None` unless the result carries a non-empty sector and a
/// positive price.
fn record_from_summary(ticker: &str, result: QuoteSummaryResult) -> Option<SecurityRecord> {
    let profile = result.asset_profile.unwrap_or_default();
    let sector = profile.sector.filter(|s| !s.is_empty())?;

    let price_module = result.price.unwrap_or_default();
    let raw_price = price_module.regular_market_price.and_then(|v| v.value())?;
    if raw_price <= 0.0 {
        return None;
    }
    let price = Decimal::try_from(raw_price).ok()?;

    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();

    Some(SecurityRecord {
        ticker: ticker.to_string(),
        sector,
        industry: profile.industry.unwrap_or_default(),
        website: profile.website.unwrap_or_default(),
        price,
        market_cap: unwrap_raw(price_module.market_cap),
        trailing_pe: unwrap_raw(detail.trailing_pe),
        dividend_yield: unwrap_raw(detail.dividend_yield),
        one_year_return: unwrap_raw(stats.fifty_two_week_change),
        beta: unwrap_raw(detail.beta),
        profit_margin: unwrap_raw(financial.profit_margins),
    })
}

fn unwrap_raw(value: Option<RawValue>) -> Option<f64> {
    value.and_then(|v| v.value())
}

/// Read a universe snapshot from CSV, dropping records without a sector.
pub fn read_universe_csv(path: &Path) -> Result<Vec<SecurityRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open snapshot {}", path.display()))?;

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in reader.deserialize::<SecurityRecord>() {
        let record = row.context("Failed to parse snapshot row")?;
        if record.sector.is_empty() {
            dropped += 1;
            continue;
        }
        records.push(record);
    }

    if dropped > 0 {
        warn!(dropped, "dropped snapshot records without a sector");
    }

    Ok(records)
}

/// Write a universe snapshot to CSV.
pub fn write_universe_csv(path: &Path, records: &[SecurityRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create snapshot {}", path.display()))?;

    for record in records {
        writer
            .serialize(record)
            .context("Failed to write snapshot row")?;
    }
    writer.flush().context("Failed to flush snapshot")?;

    Ok(())
}
