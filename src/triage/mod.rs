//! Message triage — urgency classification and conversation aggregation.

pub mod aggregator;
pub mod classifier;

pub use aggregator::{SortKey, aggregate};
pub use classifier::{Classification, classify};
