//! Metric aggregation: reduces security records into per-group summaries.

use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use crate::models::{GroupKey, GroupMetrics, MetricsTable, SecurityRecord};

use super::error::PortfolioError;

/// Aggregate records into one [`GroupMetrics`] row per distinct group.
///
/// An optional sector filter restricts the input before grouping (used to
/// aggregate one sector's records at the industry level). Sum aggregates
/// treat missing values as 0; mean aggregates are taken over defined values
/// only, so a group with no defined value for a field gets a NaN average,
/// propagated unchanged.
///
/// Rows come back in ascending group-name order.
pub fn aggregate(
    records: &[SecurityRecord],
    sector_filter: Option<&str>,
    key: GroupKey,
) -> Result<MetricsTable, PortfolioError> {
    if records.is_empty() {
        return Err(PortfolioError::InvalidInput(
            "cannot aggregate an empty security table".to_string(),
        ));
    }

    let filtered: Vec<&SecurityRecord> = match sector_filter {
        Some(sector) => records.iter().filter(|r| r.sector == sector).collect(),
        None => records.iter().collect(),
    };

    let mut groups: BTreeMap<&str, Vec<&SecurityRecord>> = BTreeMap::new();
    for record in filtered {
        let group = match key {
            GroupKey::Sector => record.sector.as_str(),
            GroupKey::Industry => record.industry.as_str(),
        };
        groups.entry(group).or_default().push(record);
    }

    let rows = groups
        .into_iter()
        .map(|(group, members)| GroupMetrics {
            group: group.to_string(),
            total_market_cap: members.iter().filter_map(|r| r.market_cap).sum(),
            avg_pe: mean_defined(&members, |r| r.trailing_pe),
            avg_dividend_yield: mean_defined(&members, |r| r.dividend_yield),
            avg_1y_return: mean_defined(&members, |r| r.one_year_return),
            avg_beta: mean_defined(&members, |r| r.beta),
        })
        .collect();

    Ok(MetricsTable { key, rows })
}

/// Mean of a field over the records where it is defined; NaN when none are.
fn mean_defined(records: &[&SecurityRecord], field: impl Fn(&SecurityRecord) -> Option<f64>) -> f64 {
    let values: Vec<f64> = records.iter().filter_map(|r| field(r)).collect();
    values.mean()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn record(ticker: &str, sector: &str, industry: &str, beta: Option<f64>) -> SecurityRecord {
        SecurityRecord {
            ticker: ticker.to_string(),
            sector: sector.to_string(),
            industry: industry.to_string(),
            website: String::new(),
            price: dec!(100),
            market_cap: Some(1e9),
            trailing_pe: Some(20.0),
            dividend_yield: None,
            one_year_return: Some(0.1),
            beta,
            profit_margin: Some(0.2),
        }
    }

    #[test]
    fn test_groups_in_ascending_order() {
        let records = vec![
            record("C", "Utilities", "Electric", Some(0.5)),
            record("A", "Energy", "Oil & Gas", Some(1.2)),
            record("B", "Energy", "Refining", Some(0.8)),
        ];

        let table = aggregate(&records, None, GroupKey::Sector).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].group, "Energy");
        assert_eq!(table.rows[1].group, "Utilities");
        assert_relative_eq!(table.rows[0].avg_beta, 1.0);
    }

    #[test]
    fn test_mean_excludes_missing_values() {
        let records = vec![
            record("A", "Energy", "Oil & Gas", Some(1.5)),
            record("B", "Energy", "Oil & Gas", None),
        ];

        let table = aggregate(&records, None, GroupKey::Sector).unwrap();

        // Missing beta excluded from numerator and denominator
        assert_relative_eq!(table.rows[0].avg_beta, 1.5);
    }

    #[test]
    fn test_all_missing_yields_nan() {
        let records = vec![
            record("A", "Energy", "Oil & Gas", None),
            record("B", "Energy", "Oil & Gas", None),
        ];

        let table = aggregate(&records, None, GroupKey::Sector).unwrap();

        assert!(table.rows[0].avg_beta.is_nan());
        // Sum aggregates still defined, missing treated as 0
        assert_relative_eq!(table.rows[0].total_market_cap, 2e9);
    }

    #[test]
    fn test_sector_filter_with_industry_grouping() {
        let records = vec![
            record("A", "Energy", "Oil & Gas", Some(1.0)),
            record("B", "Energy", "Refining", Some(1.0)),
            record("C", "Utilities", "Electric", Some(1.0)),
        ];

        let table = aggregate(&records, Some("Energy"), GroupKey::Industry).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].group, "Oil & Gas");
        assert_eq!(table.rows[1].group, "Refining");
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = aggregate(&[], None, GroupKey::Sector).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }
}
