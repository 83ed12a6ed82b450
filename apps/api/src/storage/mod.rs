//! Whole-document JSON persistence.
//!
//! Every store in the service (stats, history, profile, settings) keeps a
//! single JSON document and overwrites it after each mutation. `DocumentStore`
//! is the load/save seam; `Document` holds the authoritative in-memory copy
//! and serializes read-modify-write-persist cycles behind an async mutex.

mod document;
#[cfg(test)]
pub mod memory;
pub mod timestamp;

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

pub use document::Document;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt document {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Load/save contract for a single persisted document.
///
/// Swap the implementation to move a store onto another backend without
/// touching the code that mutates the document.
#[async_trait]
pub trait DocumentStore<T: Send + Sync + 'static>: Send + Sync {
    /// Returns `None` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<T>, StoreError>;

    async fn save(&self, document: &T) -> Result<(), StoreError>;
}

/// A document stored as pretty-printed JSON on the local filesystem.
///
/// Saves go through a sibling `.tmp` file and a rename so a crash mid-write
/// leaves the previous document in place.
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl<T> DocumentStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Option<T>, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No document at {}, using defaults", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    async fn save(&self, document: &T) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!("Wrote {} bytes to {}", body.len(), self.path.display());
        Ok(())
    }
}
