//! Within-sector stock selection: top profit margins, margin-weighted.

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::warn;

use crate::models::SecurityRecord;

use super::error::PortfolioError;

/// A stock selected for allocation, with its normalized within-sector weight
/// and the record fields the allocator carries forward.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedStock {
    pub ticker: String,
    pub sector: String,
    pub industry: String,
    pub website: String,
    pub price: Decimal,
    pub profit_margin: f64,

    /// This stock's share of the sector's selected profit margins
    pub stock_weight: f64,
}

/// Output of the per-sector selection pass.
#[derive(Debug, Clone, Default)]
pub struct StockSelection {
    /// Selected stocks, concatenated in ascending sector order
    pub stocks: Vec<SelectedStock>,

    /// Sectors whose candidates were all discarded (no positive margin)
    pub skipped_sectors: Vec<String>,
}

/// Select the top-`limit` stocks per sector by profit margin and weight them
/// by their share of the sector's selected margins.
///
/// Per sector: records without a defined margin are not candidates; the
/// remainder are sorted margin descending (ticker ascending breaks ties),
/// truncated to `limit`, and any with margin <= 0 are discarded even inside
/// the top `limit`. Within a sector the selected weights sum to 1. A sector
/// left with nothing contributes zero rows and is recorded in
/// `skipped_sectors`; its capital stays unspent downstream.
pub fn select_stocks(
    records: &[SecurityRecord],
    limit: usize,
) -> Result<StockSelection, PortfolioError> {
    if limit == 0 {
        return Err(PortfolioError::InvalidInput(
            "per-sector selection limit must be at least 1".to_string(),
        ));
    }
    if records.is_empty() {
        return Err(PortfolioError::InvalidInput(
            "cannot select stocks from an empty security table".to_string(),
        ));
    }

    let mut sectors: BTreeMap<&str, Vec<&SecurityRecord>> = BTreeMap::new();
    for record in records {
        sectors.entry(record.sector.as_str()).or_default().push(record);
    }

    let mut selection = StockSelection::default();

    for (sector, members) in sectors {
        let mut candidates: Vec<(&SecurityRecord, f64)> = members
            .into_iter()
            .filter_map(|r| r.profit_margin.map(|m| (r, m)))
            .collect();

        candidates.sort_by(|(a, ma), (b, mb)| {
            mb.partial_cmp(ma)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        candidates.truncate(limit);
        candidates.retain(|(_, margin)| *margin > 0.0);

        if candidates.is_empty() {
            warn!(sector = %sector, "no eligible stock in sector, skipping");
            selection.skipped_sectors.push(sector.to_string());
            continue;
        }

        let margin_sum: f64 = candidates.iter().map(|(_, m)| m).sum();

        selection.stocks.extend(candidates.into_iter().map(|(r, margin)| {
            SelectedStock {
                ticker: r.ticker.clone(),
                sector: r.sector.clone(),
                industry: r.industry.clone(),
                website: r.website.clone(),
                price: r.price,
                profit_margin: margin,
                stock_weight: margin / margin_sum,
            }
        }));
    }

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn record(ticker: &str, sector: &str, margin: Option<f64>) -> SecurityRecord {
        SecurityRecord {
            ticker: ticker.to_string(),
            sector: sector.to_string(),
            industry: "Industry".to_string(),
            website: String::new(),
            price: dec!(50),
            market_cap: None,
            trailing_pe: None,
            dividend_yield: None,
            one_year_return: None,
            beta: Some(1.0),
            profit_margin: margin,
        }
    }

    #[test]
    fn test_top_limit_by_margin() {
        let records = vec![
            record("A", "Tech", Some(0.1)),
            record("B", "Tech", Some(0.3)),
            record("C", "Tech", Some(0.2)),
        ];

        let selection = select_stocks(&records, 2).unwrap();

        let tickers: Vec<&str> = selection.stocks.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["B", "C"]);
    }

    #[test]
    fn test_weights_sum_to_one_per_sector() {
        let records = vec![
            record("A", "Tech", Some(0.1)),
            record("B", "Tech", Some(0.3)),
            record("C", "Energy", Some(0.05)),
        ];

        let selection = select_stocks(&records, 10).unwrap();

        for sector in ["Tech", "Energy"] {
            let sum: f64 = selection
                .stocks
                .iter()
                .filter(|s| s.sector == sector)
                .map(|s| s.stock_weight)
                .sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
        }

        // Weight proportional to margin share: B has 3/4 of Tech's margins
        let b = selection.stocks.iter().find(|s| s.ticker == "B").unwrap();
        assert_relative_eq!(b.stock_weight, 0.75, epsilon = 1e-9);
    }

    #[test]
    fn test_ties_broken_by_ticker() {
        let records = vec![
            record("ZZZ", "Tech", Some(0.2)),
            record("AAA", "Tech", Some(0.2)),
        ];

        let selection = select_stocks(&records, 1).unwrap();

        assert_eq!(selection.stocks.len(), 1);
        assert_eq!(selection.stocks[0].ticker, "AAA");
    }

    #[test]
    fn test_non_positive_margins_discarded_within_top() {
        // B makes the top 2 but has a negative margin, so it is dropped
        let records = vec![
            record("A", "Tech", Some(0.2)),
            record("B", "Tech", Some(-0.1)),
            record("C", "Tech", Some(-0.3)),
        ];

        let selection = select_stocks(&records, 2).unwrap();

        assert_eq!(selection.stocks.len(), 1);
        assert_eq!(selection.stocks[0].ticker, "A");
        assert_relative_eq!(selection.stocks[0].stock_weight, 1.0);
    }

    #[test]
    fn test_sector_with_no_eligible_stock_is_skipped() {
        let records = vec![
            record("A", "Tech", Some(0.2)),
            record("B", "Losses", Some(-0.1)),
            record("C", "Unknown", None),
        ];

        let selection = select_stocks(&records, 10).unwrap();

        assert_eq!(selection.stocks.len(), 1);
        assert_eq!(selection.skipped_sectors, vec!["Losses", "Unknown"]);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let records = vec![record("A", "Tech", Some(0.2))];
        let err = select_stocks(&records, 0).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = select_stocks(&[], 10).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }

    #[test]
    fn test_deterministic_across_runs() {
        let records = vec![
            record("B", "Tech", Some(0.2)),
            record("A", "Tech", Some(0.2)),
            record("C", "Energy", Some(0.1)),
        ];

        let first = select_stocks(&records, 10).unwrap();
        let second = select_stocks(&records, 10).unwrap();

        assert_eq!(first.stocks, second.stocks);
    }
}
