//! Wire types for the constituents, quote-summary, and chat-completions APIs.

use serde::{Deserialize, Serialize};

/// One row of the S&P 500 constituents CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct ConstituentRow {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Sector", default)]
    pub sector: String,
}

/// Envelope of the quoteSummary endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryEnvelope {
    pub quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryBody {
    #[serde(default)]
    pub result: Vec<QuoteSummaryResult>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// One quoteSummary result: the modules requested for a ticker.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    #[serde(default)]
    pub asset_profile: Option<AssetProfile>,
    #[serde(default)]
    pub price: Option<PriceModule>,
    #[serde(default)]
    pub summary_detail: Option<SummaryDetail>,
    #[serde(default)]
    pub default_key_statistics: Option<DefaultKeyStatistics>,
    #[serde(default)]
    pub financial_data: Option<FinancialData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProfile {
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    #[serde(default)]
    pub regular_market_price: Option<RawValue>,
    #[serde(default)]
    pub market_cap: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDetail {
    #[serde(default)]
    pub trailing_pe: Option<RawValue>,
    #[serde(default)]
    pub dividend_yield: Option<RawValue>,
    #[serde(default)]
    pub beta: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultKeyStatistics {
    #[serde(rename = "52WeekChange", default)]
    pub fifty_two_week_change: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialData {
    #[serde(default)]
    pub profit_margins: Option<RawValue>,
}

/// Numeric fields come wrapped as `{"raw": 1.23, "fmt": "1.23"}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawValue {
    #[serde(default)]
    pub raw: Option<f64>,
}

impl RawValue {
    pub fn value(&self) -> Option<f64> {
        self.raw
    }
}

/// Chat-completions request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Chat-completions response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}
