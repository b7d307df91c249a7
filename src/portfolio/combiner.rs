//! Weight combination: joins sector weights onto selected stocks.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::selector::StockSelection;

/// A security entering the allocator, carrying its final weight.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationCandidate {
    pub ticker: String,
    pub sector: String,
    pub industry: String,
    pub website: String,
    pub price: Decimal,

    /// stock_weight x sector_weight
    pub weight: f64,
}

/// Combine within-sector stock weights with sector weights by inner join on
/// the sector key.
///
/// A sector present on only one side (no eligible stock, or undefined beta)
/// is silently excluded, a deliberate simplification. Output keeps the
/// selection's deterministic row order.
pub fn combine_weights(
    selection: &StockSelection,
    sector_weights: &BTreeMap<String, f64>,
) -> Vec<AllocationCandidate> {
    selection
        .stocks
        .iter()
        .filter_map(|stock| {
            let sector_weight = sector_weights.get(&stock.sector)?;
            Some(AllocationCandidate {
                ticker: stock.ticker.clone(),
                sector: stock.sector.clone(),
                industry: stock.industry.clone(),
                website: stock.website.clone(),
                price: stock.price,
                weight: stock.stock_weight * sector_weight,
            })
        })
        .collect()
}
