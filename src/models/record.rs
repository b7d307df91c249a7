//! Per-security attribute record, the input row for the whole pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Financial attributes for a single security.
///
/// Attribute fields other than ticker, sector, and price are optional;
/// `None` models a value the data provider did not report. The sector is
/// guaranteed non-empty: the universe client drops records without one
/// before the pipeline sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityRecord {
    /// Ticker symbol
    pub ticker: String,

    /// GICS sector (never empty)
    pub sector: String,

    /// Industry sub-grouping within the sector
    #[serde(default)]
    pub industry: String,

    /// Company website, carried into the allocation table
    #[serde(default)]
    pub website: String,

    /// Last regular market price (> 0)
    pub price: Decimal,

    /// Market capitalization in USD
    pub market_cap: Option<f64>,

    /// Trailing price/earnings ratio
    pub trailing_pe: Option<f64>,

    /// Dividend yield (fraction, e.g. 0.02 for 2%)
    pub dividend_yield: Option<f64>,

    /// Trailing 1-year price return (fraction)
    pub one_year_return: Option<f64>,

    /// Beta, the volatility proxy used for sector weighting
    pub beta: Option<f64>,

    /// Profit margin (fraction), used to rank stocks within a sector
    pub profit_margin: Option<f64>,
}
