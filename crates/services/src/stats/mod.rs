mod aggregator;
pub mod keys;
mod watcher;

pub use aggregator::StatsAggregator;
pub use watcher::{DEFAULT_REFRESH_INTERVAL, StatsWatcher};
