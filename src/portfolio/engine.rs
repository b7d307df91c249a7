//! Pipeline orchestration: records in, portfolio plan out.

use chrono::Utc;
use tracing::info;

use crate::models::{GroupKey, PortfolioConfig, PortfolioPlan, SecurityRecord};

use super::allocator::allocate;
use super::combiner::combine_weights;
use super::error::PortfolioError;
use super::selector::select_stocks;
use super::{aggregator, sector_weights};

/// Run the full weighting and allocation pipeline over one immutable
/// snapshot of records.
///
/// Stages: sector-level metric aggregation -> inverse-beta sector weights ->
/// per-sector stock selection -> weight combination -> discrete allocation.
/// Every stage is a pure function; a failure in any stage aborts the run
/// with no partial output.
pub fn build_plan(
    records: &[SecurityRecord],
    config: &PortfolioConfig,
) -> Result<PortfolioPlan, PortfolioError> {
    let metrics = aggregator::aggregate(records, None, GroupKey::Sector)?;
    let weights = sector_weights::sector_weights(&metrics)?;

    let selection = select_stocks(records, config.sector_limit)?;
    if selection.stocks.is_empty() {
        return Err(PortfolioError::NoEligibleStocks);
    }

    let candidates = combine_weights(&selection, &weights);
    if candidates.is_empty() {
        return Err(PortfolioError::NoEligibleStocks);
    }

    let table = allocate(&candidates, config.budget)?;

    info!(
        candidates = candidates.len(),
        spent = %table.spent,
        unspent = %table.unspent,
        "portfolio plan built"
    );

    Ok(PortfolioPlan {
        table,
        sector_weights: weights,
        skipped_sectors: selection.skipped_sectors,
        candidate_count: candidates.len(),
        generated_at: Utc::now(),
    })
}
