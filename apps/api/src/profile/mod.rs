//! The candidate profile and the uploaded résumé it was extracted from.

pub mod extract;
pub mod handlers;
mod model;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::mailer::Attachment;
use crate::storage::{Document, DocumentStore, StoreError};

pub use model::{normalize_profile, Experience, Profile};

/// The single candidate profile. Absent until a résumé is analyzed or a
/// profile is saved by hand.
pub struct ProfileStore {
    document: Document<Option<Profile>>,
}

impl ProfileStore {
    pub async fn open(store: Arc<dyn DocumentStore<Option<Profile>>>) -> Result<Self, StoreError> {
        Ok(Self {
            document: Document::open(store).await?,
        })
    }

    pub async fn get(&self) -> Option<Profile> {
        self.document.read().await
    }

    pub async fn replace(&self, profile: Profile) -> Result<Profile, StoreError> {
        let profile = profile.tidied();
        let saved = profile.clone();
        self.document
            .update(move |current| *current = Some(profile))
            .await?;
        Ok(saved)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResume {
    pub filename: String,
    pub path: PathBuf,
    pub uploaded_at: DateTime<Utc>,
}

/// Keeps the most recently uploaded résumé PDF for use as an attachment.
pub struct ResumeVault {
    dir: PathBuf,
    current: Document<Option<StoredResume>>,
}

impl ResumeVault {
    pub async fn open(
        dir: impl Into<PathBuf>,
        store: Arc<dyn DocumentStore<Option<StoredResume>>>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            dir: dir.into(),
            current: Document::open(store).await?,
        })
    }

    /// Writes the upload to disk and makes it the current résumé.
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<StoredResume, StoreError> {
        let filename = sanitize_filename(original_name);
        let path = self.dir.join(&filename);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        let stored = StoredResume {
            filename,
            path,
            uploaded_at: Utc::now(),
        };
        let saved = stored.clone();
        self.current
            .update(move |current| *current = Some(stored))
            .await?;

        info!("Résumé stored at {}", saved.path.display());
        Ok(saved)
    }

    pub async fn current(&self) -> Option<StoredResume> {
        self.current.read().await
    }

    /// The current résumé as a mail attachment, or `None` if there is none
    /// or its file has gone missing.
    pub async fn load_attachment(&self) -> Result<Option<Attachment>, StoreError> {
        let Some(resume) = self.current().await else {
            return Ok(None);
        };
        match tokio::fs::read(&resume.path).await {
            Ok(bytes) => Ok(Some(Attachment {
                filename: resume.filename,
                bytes,
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Résumé file {} is missing, sending without it", resume.path.display());
                Ok(None)
            }
            Err(source) => Err(StoreError::Io {
                path: resume.path,
                source,
            }),
        }
    }
}

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "resume.pdf".to_string()
    } else {
        cleaned.to_string()
    }
}
