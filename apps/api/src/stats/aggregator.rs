use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::stats::model::{SendEvent, StatsRecord, StatsSnapshot};
use crate::stats::StatsError;
use crate::storage::{Document, DocumentStore, StoreError};

/// Running send statistics backed by a single persisted `StatsRecord`.
///
/// Every mutation is written through to the store before returning. If the
/// write fails the in-memory aggregate still holds the change, the error is
/// returned, and snapshots report `stale: true` until a later write succeeds.
pub struct StatsAggregator {
    document: Document<StatsRecord>,
    sample_cap: usize,
}

impl StatsAggregator {
    pub async fn open(
        store: Arc<dyn DocumentStore<StatsRecord>>,
        sample_cap: usize,
    ) -> Result<Self, StoreError> {
        let document = Document::open(store).await?;
        Ok(Self {
            document,
            sample_cap,
        })
    }

    pub async fn record_send(&self, event: SendEvent) -> Result<(), StatsError> {
        event.validate()?;

        let cap = self.sample_cap;
        let (successes, total, rate) = self
            .document
            .update(|record| {
                record.apply_send(&event, cap, Utc::now());
                (
                    record.emails_by_status.success,
                    record.total_sent,
                    record.success_rate(),
                )
            })
            .await?;

        info!(
            "Stats updated: {successes}/{total} successful ({rate}%), last status {}",
            event.status
        );
        Ok(())
    }

    pub async fn record_cv_analysis(&self) -> Result<(), StatsError> {
        self.document
            .update(|record| {
                record.ai_usage.cv_analyzed += 1;
                record.last_updated = Some(Utc::now());
            })
            .await?;
        Ok(())
    }

    pub async fn record_ai_generation(&self) -> Result<(), StatsError> {
        self.document
            .update(|record| {
                record.ai_usage.emails_generated += 1;
                record.last_updated = Some(Utc::now());
            })
            .await?;
        Ok(())
    }

    pub async fn snapshot(&self) -> StatsSnapshot {
        let (record, stale) = self.document.read_with_staleness().await;
        record.snapshot(stale)
    }

    /// Clears every counter and sample. Irreversible.
    pub async fn reset(&self) -> Result<(), StatsError> {
        self.document
            .update(|record| {
                *record = StatsRecord {
                    last_updated: Some(Utc::now()),
                    ..StatsRecord::default()
                };
            })
            .await?;
        warn!("Statistics reset");
        Ok(())
    }
}
