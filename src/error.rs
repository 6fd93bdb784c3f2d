// src/error.rs

//! Unified error handling for the harvester.
//!
//! Once a page is open, only [`AppError::Navigation`] and
//! [`AppError::LoginTimeout`] end a collection run on their own;
//! [`AppError::Cancelled`] comes from the caller's cancellation wrapper.
//! Everything else raised while driving the page is recovered inside the
//! engine and degrades into default field values, dropped records or an early
//! end of the loading loop.

use std::fmt;

use thiserror::Error;

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Navigation to the target page failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// The login gate did not clear in time
    #[error("Login gate did not clear within {waited_secs}s")]
    LoginTimeout { waited_secs: u64 },

    /// The caller cancelled the run
    #[error("Collection cancelled")]
    Cancelled,

    /// Browser session could not be opened
    #[error("Browser session error: {0}")]
    Browser(String),

    /// WebDriver endpoint answered with an error payload
    #[error("WebDriver error '{error}': {message}")]
    WebDriver { error: String, message: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a navigation error for the given URL.
    pub fn navigation(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a WebDriver protocol error.
    pub fn webdriver(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WebDriver {
            error: error.into(),
            message: message.into(),
        }
    }

    /// Create a browser session error.
    pub fn browser(message: impl fmt::Display) -> Self {
        Self::Browser(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error ends a collection run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Navigation { .. } | Self::LoginTimeout { .. } | Self::Cancelled
        )
    }
}
