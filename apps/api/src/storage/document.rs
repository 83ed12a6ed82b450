use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use super::{DocumentStore, StoreError};

struct Slot<T> {
    value: T,
    /// Set when the last save failed; cleared by the next successful one.
    stale: bool,
}

/// The authoritative in-memory copy of a persisted document.
///
/// `update` holds the lock across the mutation and the save, so concurrent
/// requests never interleave their writes. A failed save keeps the mutation
/// in memory and marks the document stale.
pub struct Document<T: Send + Sync + 'static> {
    store: Arc<dyn DocumentStore<T>>,
    slot: Mutex<Slot<T>>,
}

impl<T> Document<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    /// Loads the persisted document, falling back to `T::default()` when none exists.
    pub async fn open(store: Arc<dyn DocumentStore<T>>) -> Result<Self, StoreError> {
        let value = store.load().await?.unwrap_or_default();
        Ok(Self {
            store,
            slot: Mutex::new(Slot {
                value,
                stale: false,
            }),
        })
    }

    pub async fn read(&self) -> T {
        self.slot.lock().await.value.clone()
    }

    /// Returns the current value and whether it differs from what is on disk.
    pub async fn read_with_staleness(&self) -> (T, bool) {
        let slot = self.slot.lock().await;
        (slot.value.clone(), slot.stale)
    }

    pub async fn update<R>(&self, mutate: impl FnOnce(&mut T) -> R) -> Result<R, StoreError> {
        let mut slot = self.slot.lock().await;
        let result = mutate(&mut slot.value);

        match self.store.save(&slot.value).await {
            Ok(()) => {
                slot.stale = false;
                Ok(result)
            }
            Err(e) => {
                warn!("Persist failed, keeping unflushed state in memory: {e}");
                slot.stale = true;
                Err(e)
            }
        }
    }
}
