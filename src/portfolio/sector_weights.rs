//! Sector weighting: lower average beta earns a larger capital share.

use std::collections::BTreeMap;
use tracing::debug;

use crate::models::MetricsTable;

use super::error::PortfolioError;

/// Derive normalized sector weights from a sector-level metrics table.
///
/// weight(s) = (1/beta(s)) / Σ_t (1/beta(t)), taken over the sectors whose
/// average beta is defined; sectors with a NaN average beta are skipped.
/// A defined beta of exactly zero has no inverse and fails the whole
/// computation.
///
/// The returned weights sum to 1 over the included sectors. A negative
/// average beta yields a negative weight, passed through unmodified; the
/// allocator rejects it downstream.
pub fn sector_weights(metrics: &MetricsTable) -> Result<BTreeMap<String, f64>, PortfolioError> {
    let mut inverses: BTreeMap<String, f64> = BTreeMap::new();

    for row in &metrics.rows {
        if row.avg_beta.is_nan() {
            debug!(sector = %row.group, "skipping sector with undefined average beta");
            continue;
        }
        if row.avg_beta == 0.0 {
            return Err(PortfolioError::ZeroBeta {
                sector: row.group.clone(),
            });
        }
        inverses.insert(row.group.clone(), 1.0 / row.avg_beta);
    }

    let total: f64 = inverses.values().sum();

    Ok(inverses
        .into_iter()
        .map(|(sector, inv)| (sector, inv / total))
        .collect())
}
