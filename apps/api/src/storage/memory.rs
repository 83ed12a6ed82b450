use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{DocumentStore, StoreError};

/// In-process `DocumentStore` for tests. Can be told to fail saves.
pub struct MemoryStore<T> {
    value: Mutex<Option<T>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            fail_saves: AtomicBool::new(false),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn with_value(value: T) -> Self {
        let store = Self::new();
        *store.value.lock().unwrap() = Some(value);
        store
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn saved(&self) -> Option<T> {
        self.value.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T> DocumentStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Option<T>, StoreError> {
        Ok(self.value.lock().unwrap().clone())
    }

    async fn save(&self, document: &T) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: "memory".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        *self.value.lock().unwrap() = Some(document.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
