//! Data models for securities, group metrics, allocations, and configuration.

mod allocation;
mod config;
mod metrics;
mod record;

pub use allocation::{AllocationRow, AllocationTable, PortfolioPlan};
pub use config::PortfolioConfig;
pub use metrics::{GroupKey, GroupMetrics, MetricsTable};
pub use record::SecurityRecord;
