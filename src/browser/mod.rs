//! Page-rendering abstractions.
//!
//! The engine never renders anything itself. It drives a [`Page`] opened by a
//! [`Browser`] and reads the rendered DOM back as HTML snapshots.

pub mod webdriver;

#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;

use crate::error::Result;

pub use webdriver::{WebDriverBrowser, WebDriverPage};

/// One rendered page owned by a single collection run.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate and wait for the load to finish.
    async fn goto(&self, url: &str) -> Result<()>;

    /// URL the page ended up on after redirects.
    async fn current_url(&self) -> Result<String>;

    /// Document title.
    async fn title(&self) -> Result<String>;

    /// Serialized current DOM.
    async fn content(&self) -> Result<String>;

    /// Scroll the viewport to the bottom of the document.
    async fn scroll_to_bottom(&self) -> Result<()>;

    /// Click the first element matching `selector` if it is displayed.
    ///
    /// Returns `Ok(false)` when nothing matched or the match is hidden.
    async fn click_if_visible(&self, selector: &str) -> Result<bool>;

    /// Release the underlying session.
    async fn close(&self) -> Result<()>;
}

/// Opens pages. One page per collection run.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn open(&self) -> Result<Box<dyn Page>>;
}
