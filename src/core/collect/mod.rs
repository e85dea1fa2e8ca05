//! Detail collection over a resource listing

pub mod collector;
pub mod stats;

pub use collector::{CollectedRecord, RecordCollector};
pub use stats::CollectionStats;
