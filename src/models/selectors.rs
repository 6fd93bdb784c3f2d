// src/models/selectors.rs

//! CSS selector lists for locating comments and their fields.

use serde::{Deserialize, Serialize};

/// Ordered CSS selector candidates, one list per logical target.
///
/// Lists are tried front to back. `author_badge` and `replies` are matched
/// as a single selector group so hits come back in document order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectorConfig {
    /// Strategies for the comment container nodes
    #[serde(default = "defaults::nodes")]
    pub nodes: Vec<String>,

    /// Candidates for the comment body
    #[serde(default = "defaults::text")]
    pub text: Vec<String>,

    /// Candidates for the display name
    #[serde(default = "defaults::author")]
    pub author: Vec<String>,

    /// Candidates for the like counter
    #[serde(default = "defaults::likes")]
    pub likes: Vec<String>,

    /// Candidates for the display time
    #[serde(default = "defaults::published")]
    pub published: Vec<String>,

    /// Markers of the post-author badge
    #[serde(default = "defaults::author_badge")]
    pub author_badge: Vec<String>,

    /// Reply elements nested under a comment
    #[serde(default = "defaults::replies")]
    pub replies: Vec<String>,

    /// Candidates for the post title
    #[serde(default = "defaults::title")]
    pub title: Vec<String>,

    /// One-time "expand comments" affordance
    #[serde(default = "defaults::expand")]
    pub expand: Vec<String>,

    /// "Load more" affordance clicked during stabilization
    #[serde(default = "defaults::load_more")]
    pub load_more: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            nodes: defaults::nodes(),
            text: defaults::text(),
            author: defaults::author(),
            likes: defaults::likes(),
            published: defaults::published(),
            author_badge: defaults::author_badge(),
            replies: defaults::replies(),
            title: defaults::title(),
            expand: defaults::expand(),
            load_more: defaults::load_more(),
        }
    }
}

impl SelectorConfig {
    /// All lists paired with their config key, for validation.
    pub fn lists(&self) -> [(&'static str, &[String]); 10] {
        [
            ("selectors.nodes", self.nodes.as_slice()),
            ("selectors.text", self.text.as_slice()),
            ("selectors.author", self.author.as_slice()),
            ("selectors.likes", self.likes.as_slice()),
            ("selectors.published", self.published.as_slice()),
            ("selectors.author_badge", self.author_badge.as_slice()),
            ("selectors.replies", self.replies.as_slice()),
            ("selectors.title", self.title.as_slice()),
            ("selectors.expand", self.expand.as_slice()),
            ("selectors.load_more", self.load_more.as_slice()),
        ]
    }

    /// Join a list into one selector group (`a, b, c`).
    pub fn group(list: &[String]) -> String {
        list.join(", ")
    }
}

mod defaults {
    fn owned(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    pub fn nodes() -> Vec<String> {
        owned(&[
            r#"[class*="comment-item"]"#,
            r#"[class*="commentItem"]"#,
            ".comment-inner",
            r#"[class*="comment"] > div"#,
        ])
    }
    pub fn text() -> Vec<String> {
        owned(&[r#"[class*="content"]"#, ".text", "p", "span"])
    }
    pub fn author() -> Vec<String> {
        owned(&[r#"[class*="nickname"]"#, r#"[class*="name"]"#, ".user", "a"])
    }
    pub fn likes() -> Vec<String> {
        owned(&[r#"[class*="like"]"#, r#"[class*="count"]"#, ".likes"])
    }
    pub fn published() -> Vec<String> {
        owned(&[r#"[class*="time"]"#, r#"[class*="date"]"#, "time"])
    }
    pub fn author_badge() -> Vec<String> {
        owned(&[r#"[class*="author"]"#, r#"[class*="作者"]"#])
    }
    pub fn replies() -> Vec<String> {
        owned(&[r#"[class*="reply"]"#, r#"[class*="sub-comment"]"#])
    }
    pub fn title() -> Vec<String> {
        owned(&[".title", ".note-title", "h1"])
    }
    pub fn expand() -> Vec<String> {
        owned(&[r#"[class*="comment"] button"#, ".show-more"])
    }
    pub fn load_more() -> Vec<String> {
        owned(&[r#"[class*="more"]"#, ".load-more", r#"[class*="展开"]"#])
    }
}
