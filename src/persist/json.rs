//! JSON file store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{PersistError, Persistence};
use crate::desk::DeskSnapshot;

/// Snapshot store backed by a single pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_atomic(&self, json: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_data().await?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.path).await
    }
}

#[async_trait]
impl Persistence for JsonFileStore {
    async fn load(&self) -> Result<DeskSnapshot, PersistError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No store file, starting empty");
                return Ok(DeskSnapshot::default());
            }
            Err(source) => {
                return Err(PersistError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let snapshot: DeskSnapshot =
            serde_json::from_str(&content).map_err(|source| PersistError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(
            requests = snapshot.requests.len(),
            knowledge = snapshot.knowledge.len(),
            "Loaded store"
        );
        Ok(snapshot)
    }

    async fn save(&self, snapshot: &DeskSnapshot) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        self.write_atomic(&json)
            .await
            .map_err(|source| PersistError::Write {
                path: self.path.clone(),
                source,
            })?;
        tracing::trace!(path = %self.path.display(), "Saved store");
        Ok(())
    }
}
