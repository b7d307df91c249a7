//! Typed errors for the weighting and allocation pipeline.

use thiserror::Error;

/// Failures raised at a pipeline stage's boundary.
///
/// Each stage validates its input before any numeric work; a failure aborts
/// that stage entirely and no partial output is returned.
#[derive(Debug, Error, PartialEq)]
pub enum PortfolioError {
    /// A sector's defined average beta is exactly zero, so its inverse
    /// weight is undefined.
    #[error("sector '{sector}' has an average beta of zero")]
    ZeroBeta { sector: String },

    /// Input rejected at a stage boundary.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No sector contributed any eligible stock, so there is nothing to
    /// allocate.
    #[error("no sector contributed an eligible stock")]
    NoEligibleStocks,

    /// The residual redistribution loop stopped making progress. Cannot
    /// happen for validated input; guards against hangs on pathological
    /// data.
    #[error("residual redistribution stalled after {passes} passes")]
    RedistributionStalled { passes: usize },
}
