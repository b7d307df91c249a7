//! Portfolio configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Configuration for the allocation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioConfig {
    /// Total cash budget to allocate, in USD
    pub budget: Decimal,

    /// Maximum number of stocks to select from each sector
    pub sector_limit: usize,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            budget: dec!(10000),
            sector_limit: 10,
        }
    }
}
