//! Storage abstractions for collection results.
//!
//! A result is stored as one pretty-printed UTF-8 JSON document:
//!
//! ```text
//! {
//!   "url": "...",
//!   "title": "...",
//!   "crawl_time": "2026-10-17T08:00:00Z",
//!   "total_comments": 2,
//!   "comments": [ { "index": 1, "author": "...", "text": "...", ... } ]
//! }
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::CollectionResult;

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Where the document was written
    pub location: String,
    /// Number of comments written
    pub comment_count: usize,
    /// Size of the document in bytes
    pub bytes: usize,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Trait for result storage backends.
#[async_trait]
pub trait ResultStorage: Send + Sync {
    /// Persist a result under `key`, replacing any previous document.
    async fn save(&self, key: &str, result: &CollectionResult) -> Result<WriteMetadata>;

    /// Load a result, `None` if nothing is stored under `key`.
    async fn load(&self, key: &str) -> Result<Option<CollectionResult>>;
}
