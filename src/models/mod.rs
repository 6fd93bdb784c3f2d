// src/models/mod.rs

//! Domain models for the harvester.
//!
//! Records produced by a collection run, and the configuration that tunes it.

mod comment;
mod config;
mod selectors;

// Re-export all public types
pub use comment::{CollectionResult, CollectionSummary, CommentRecord};
pub use config::{BrowserConfig, CollectorConfig, Config, ExtractionConfig};
pub use selectors::SelectorConfig;
