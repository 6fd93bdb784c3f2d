//! Service layer for the harvester.
//!
//! This module contains the collection engine's building blocks:
//! - Locator compilation and ordered fallback (`Locator`, `LocatorChain`)
//! - Comment node discovery (`NodeDiscovery`)
//! - Per-node field extraction (`FieldExtractor`)
//! - The scroll-and-settle loop (`Stabilizer`)

mod discovery;
mod extractor;
mod locator;
mod stabilizer;

pub use discovery::NodeDiscovery;
pub use extractor::FieldExtractor;
pub use locator::{Locator, LocatorChain, element_text};
pub use stabilizer::{StabilizeOutcome, Stabilizer, StaleTracker, StopReason};

use crate::error::Result;

/// Await a best-effort page action. Failure is logged and becomes `None`.
pub async fn opportunistic<T>(action: &str, fut: impl Future<Output = Result<T>>) -> Option<T> {
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("Ignoring failed {}: {}", action, e);
            None
        }
    }
}
