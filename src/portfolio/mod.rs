//! The weighting and discrete-allocation engine.
//!
//! Every stage is a pure, synchronous function over immutable inputs:
//! metric aggregation, inverse-beta sector weighting, margin-based stock
//! selection, weight combination, and whole-share allocation.

pub mod aggregator;
mod allocator;
mod combiner;
mod engine;
mod error;
mod sector_weights;
mod selector;

pub use allocator::allocate;
pub use combiner::{combine_weights, AllocationCandidate};
pub use engine::build_plan;
pub use error::PortfolioError;
pub use sector_weights::sector_weights;
pub use selector::{select_stocks, SelectedStock, StockSelection};
