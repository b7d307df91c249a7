//! Aggregated group metrics: per-sector or per-industry summary statistics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grouping level for metric aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    Sector,
    Industry,
}

impl GroupKey {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "industry" => Self::Industry,
            _ => Self::Sector,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sector => write!(f, "sector"),
            Self::Industry => write!(f, "industry"),
        }
    }
}

/// Summary statistics for one group (a sector or an industry).
///
/// Sum aggregates treat missing values as 0. Mean aggregates are taken over
/// the defined values only; a group where every record is missing a field
/// has a NaN average for that field, propagated unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMetrics {
    /// Group name (sector or industry, per the table's key)
    pub group: String,

    /// Total market capitalization in USD (missing values count as 0)
    pub total_market_cap: f64,

    /// Average trailing P/E ratio over defined values
    pub avg_pe: f64,

    /// Average dividend yield over defined values
    pub avg_dividend_yield: f64,

    /// Average trailing 1-year return over defined values
    pub avg_1y_return: f64,

    /// Average beta over defined values
    pub avg_beta: f64,
}

/// A metrics table: one row per distinct group, in ascending group-name order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsTable {
    /// The grouping level the rows were aggregated at
    pub key: GroupKey,

    pub rows: Vec<GroupMetrics>,
}

impl fmt::Display for MetricsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<28} {:>18} {:>9} {:>9} {:>9} {:>7}",
            self.key.to_string().to_uppercase(),
            "MKT CAP",
            "P/E",
            "DIV YLD",
            "1Y RET",
            "BETA"
        )?;
        writeln!(f, "{}", "-".repeat(84))?;

        for row in &self.rows {
            writeln!(
                f,
                "{:<28} {:>18} {:>9} {:>9} {:>9} {:>7}",
                truncate(&row.group, 26),
                format_cap(row.total_market_cap),
                format_avg(row.avg_pe, 2),
                format_pct(row.avg_dividend_yield),
                format_pct(row.avg_1y_return),
                format_avg(row.avg_beta, 2),
            )?;
        }

        Ok(())
    }
}

fn format_cap(cap: f64) -> String {
    if cap >= 1e12 {
        format!("${:.2}T", cap / 1e12)
    } else if cap >= 1e9 {
        format!("${:.2}B", cap / 1e9)
    } else if cap >= 1e6 {
        format!("${:.2}M", cap / 1e6)
    } else {
        format!("${:.0}", cap)
    }
}

fn format_avg(v: f64, precision: usize) -> String {
    if v.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.*}", precision, v)
    }
}

fn format_pct(v: f64) -> String {
    if v.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}%", v * 100.0)
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
