//! Bank product analysis results.
//!
//! The analyzer (an external batch job) writes one row per client to
//! [`RESULT_PATH`]. On every request this module rereads that file, turns it
//! into [`Row`]s and counts clients per recommended product.

mod csv;
mod loader;
mod stats;

pub use csv::{Row, parse};
pub use loader::{AnalysisError, RESULT_PATH, Report, ResultLoader};
pub use stats::{CategoryColumns, ProductCounts, Statistics, UNKNOWN_LABEL};
