//! Comment record and collection result structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One harvested comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    /// 1-based position in the output of one run
    pub index: usize,

    /// Display name (empty if unresolved)
    #[serde(default, alias = "nickname")]
    pub author: String,

    /// Comment body, truncated
    #[serde(alias = "content")]
    pub text: String,

    /// Like count (0 if unresolved)
    #[serde(default, alias = "likes")]
    pub like_count: u64,

    /// Display time string as rendered by the page
    #[serde(default, alias = "time")]
    pub published_at: String,

    /// Whether the node carries the post-author badge
    #[serde(default, alias = "is_author_reply")]
    pub is_author_reply: bool,

    /// First replies shown under the comment
    #[serde(default, alias = "sub_comments")]
    pub replies: Vec<String>,
}

/// Output of one collection run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionResult {
    /// Source page URL
    pub url: String,

    /// Resolved post title
    #[serde(default)]
    pub title: String,

    /// When the collection finished
    pub crawl_time: DateTime<Utc>,

    /// Number of records, always `comments.len()` for a fresh run
    pub total_comments: usize,

    /// Records in discovery order
    pub comments: Vec<CommentRecord>,
}

impl CollectionResult {
    /// Assemble a result stamped with the current time.
    pub fn new(url: impl Into<String>, title: impl Into<String>, comments: Vec<CommentRecord>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            crawl_time: Utc::now(),
            total_comments: comments.len(),
            comments,
        }
    }

    /// Aggregate counters for display.
    pub fn summary(&self) -> CollectionSummary {
        CollectionSummary {
            comments: self.comments.len(),
            author_replies: self.comments.iter().filter(|c| c.is_author_reply).count(),
            total_likes: self.comments.iter().map(|c| c.like_count).sum(),
            replies: self.comments.iter().map(|c| c.replies.len()).sum(),
        }
    }
}

/// Aggregate counters over a collection result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub comments: usize,
    pub author_replies: usize,
    pub total_likes: u64,
    pub replies: usize,
}
