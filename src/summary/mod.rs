//! The Aggregation Engine: totals and per-category breakdowns of transactions.

mod core;
mod endpoint;

pub use core::{CategoryKey, Summary, aggregate, summarize};
pub use endpoint::get_summary_endpoint;
