//! Local filesystem storage implementation.
//!
//! Documents are written atomically: the JSON goes to a temporary sibling
//! first and is renamed over the target, so a crash never leaves a torn file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::CollectionResult;
use crate::storage::{ResultStorage, WriteMetadata};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Storage rooted at the parent of `file`, plus the key for `file`.
    pub fn for_file(file: &Path) -> Result<(Self, String)> {
        let key = file
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| AppError::config(format!("Invalid output path {}", file.display())))?
            .to_string();
        let root = file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        Ok((Self::new(root), key))
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl ResultStorage for LocalStorage {
    async fn save(&self, key: &str, result: &CollectionResult) -> Result<WriteMetadata> {
        let bytes = serde_json::to_vec_pretty(result)?;
        let path = self.write_bytes(key, &bytes).await?;

        Ok(WriteMetadata {
            location: path.display().to_string(),
            comment_count: result.comments.len(),
            bytes: bytes.len(),
            timestamp: Utc::now(),
        })
    }

    async fn load(&self, key: &str) -> Result<Option<CollectionResult>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}
