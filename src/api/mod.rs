//! API clients for the constituents, quote-summary, and chat-completions
//! endpoints.

mod narrative;
pub mod types;
mod universe;

pub use narrative::NarrativeClient;
pub use universe::{read_universe_csv, write_universe_csv, UniverseClient};
