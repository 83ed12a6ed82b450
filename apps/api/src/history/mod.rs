//! Bounded log of recent send attempts, newest first.

pub mod handlers;

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::stats::SendStatus;
use crate::storage::{Document, DocumentStore, StoreError};

pub const HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(deserialize_with = "entry_id")]
    pub id: Uuid,
    pub to_email: String,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub status: SendStatus,
    #[serde(deserialize_with = "crate::storage::timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

/// Older history files numbered their entries; those numbers are mapped
/// onto UUIDs so the ids stay stable across reloads.
fn entry_id<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Uuid(Uuid),
        Sequence(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Uuid(id) => id,
        RawId::Sequence(n) => Uuid::from_u128(u128::from(n)),
    })
}

impl HistoryEntry {
    pub fn new(
        to_email: impl Into<String>,
        company_name: Option<String>,
        job_title: Option<String>,
        status: SendStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            to_email: to_email.into(),
            company_name,
            job_title,
            status,
            timestamp: Utc::now(),
        }
    }
}

/// FIFO-bounded history: once `capacity` is reached, each insert evicts the
/// oldest entry.
pub struct HistoryLog {
    document: Document<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl HistoryLog {
    pub async fn open(
        store: Arc<dyn DocumentStore<VecDeque<HistoryEntry>>>,
    ) -> Result<Self, StoreError> {
        Self::with_capacity(store, HISTORY_CAPACITY).await
    }

    pub async fn with_capacity(
        store: Arc<dyn DocumentStore<VecDeque<HistoryEntry>>>,
        capacity: usize,
    ) -> Result<Self, StoreError> {
        let document = Document::open(store).await?;

        let loaded = document.read().await.len();
        if loaded > capacity {
            info!("History file holds {loaded} entries, keeping the newest {capacity}");
            if let Err(e) = document.update(|entries| entries.truncate(capacity)).await {
                warn!("Trimmed history not saved: {e}");
            }
        }

        Ok(Self { document, capacity })
    }

    pub async fn record(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        let capacity = self.capacity;
        self.document
            .update(|entries| {
                entries.push_front(entry);
                entries.truncate(capacity);
            })
            .await
    }

    /// Current entries, newest first.
    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.document.read().await.into_iter().collect()
    }

    pub async fn entries_with_status(&self, status: SendStatus) -> Vec<HistoryEntry> {
        self.document
            .read()
            .await
            .into_iter()
            .filter(|entry| entry.status == status)
            .collect()
    }
}
