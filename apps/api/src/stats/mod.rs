//! Send statistics: running counters, success rate, top companies and
//! monthly buckets derived from a stream of send and résumé-analysis events.

pub mod aggregator;
pub mod handlers;
pub mod model;

use thiserror::Error;

use crate::storage::StoreError;

pub use aggregator::StatsAggregator;
pub use model::{SendEvent, SendStatus, StatsRecord, StatsSnapshot};

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Invalid send event: {0}")]
    Validation(String),

    #[error("Failed to persist statistics: {0}")]
    Persistence(#[from] StoreError),
}
