//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SelectorConfig;
use crate::services::Locator;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Browser session and navigation settings
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Stabilization loop tuning
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Field extraction bounds
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Locator lists
    #[serde(default)]
    pub selectors: SelectorConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.browser.webdriver_url)
            .map_err(|e| AppError::validation(format!("browser.webdriver_url: {e}")))?;
        if self.browser.navigation_timeout_secs == 0 {
            return Err(AppError::validation(
                "browser.navigation_timeout_secs must be > 0",
            ));
        }
        if self.browser.login_timeout_secs == 0 {
            return Err(AppError::validation("browser.login_timeout_secs must be > 0"));
        }
        if self.browser.login_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(AppError::validation("browser.login_markers is empty"));
        }
        if self.collector.max_rounds == 0 {
            return Err(AppError::validation("collector.max_rounds must be > 0"));
        }
        if self.collector.stale_threshold == 0 {
            return Err(AppError::validation("collector.stale_threshold must be > 0"));
        }
        if self.collector.stale_streaks == 0 {
            return Err(AppError::validation("collector.stale_streaks must be > 0"));
        }
        if self.extraction.max_text_chars == 0 {
            return Err(AppError::validation("extraction.max_text_chars must be > 0"));
        }
        if self.extraction.max_author_chars == 0 {
            return Err(AppError::validation(
                "extraction.max_author_chars must be > 0",
            ));
        }

        for (key, list) in self.selectors.lists() {
            if list.is_empty() {
                return Err(AppError::validation(format!("{key} is empty")));
            }
            for selector in list {
                Locator::parse(selector)?;
            }
        }
        Ok(())
    }
}

/// Browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// WebDriver endpoint (chromedriver, etc.)
    #[serde(default = "defaults::webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default)]
    pub headless: bool,

    /// Persistent profile directory holding the login session
    #[serde(default = "defaults::user_data_dir")]
    pub user_data_dir: PathBuf,

    /// Window width in pixels
    #[serde(default = "defaults::window_width")]
    pub window_width: u32,

    /// Window height in pixels
    #[serde(default = "defaults::window_height")]
    pub window_height: u32,

    /// Browser UI language
    #[serde(default = "defaults::locale")]
    pub locale: String,

    /// Page load timeout in seconds
    #[serde(default = "defaults::navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// How long to wait for a manual login in seconds
    #[serde(default = "defaults::login_timeout")]
    pub login_timeout_secs: u64,

    /// Login gate polling interval in milliseconds
    #[serde(default = "defaults::login_poll")]
    pub login_poll_ms: u64,

    /// Case-insensitive URL substrings that indicate a login gate
    #[serde(default = "defaults::login_markers")]
    pub login_markers: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: defaults::webdriver_url(),
            headless: false,
            user_data_dir: defaults::user_data_dir(),
            window_width: defaults::window_width(),
            window_height: defaults::window_height(),
            locale: defaults::locale(),
            navigation_timeout_secs: defaults::navigation_timeout(),
            login_timeout_secs: defaults::login_timeout(),
            login_poll_ms: defaults::login_poll(),
            login_markers: defaults::login_markers(),
        }
    }
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    pub fn login_poll(&self) -> Duration {
        Duration::from_millis(self.login_poll_ms)
    }

    /// Whether a resolved URL points at the login gate.
    pub fn is_login_gate(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.login_markers
            .iter()
            .map(|m| m.trim().to_lowercase())
            .any(|m| !m.is_empty() && url.contains(&m))
    }
}

/// Stabilization loop tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Maximum scroll rounds
    #[serde(default = "defaults::max_rounds")]
    pub max_rounds: usize,

    /// Pause after each scroll in milliseconds
    #[serde(default = "defaults::settle")]
    pub settle_ms: u64,

    /// Pause after a successful affordance click in milliseconds
    #[serde(default = "defaults::click_settle")]
    pub click_settle_ms: u64,

    /// Pause after each navigation in milliseconds
    #[serde(default = "defaults::initial_settle")]
    pub initial_settle_ms: u64,

    /// Consecutive rounds without growth that make one stale streak
    #[serde(default = "defaults::stale_threshold")]
    pub stale_threshold: usize,

    /// Stale streaks needed before stopping early
    #[serde(default = "defaults::stale_streaks")]
    pub stale_streaks: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_rounds: defaults::max_rounds(),
            settle_ms: defaults::settle(),
            click_settle_ms: defaults::click_settle(),
            initial_settle_ms: defaults::initial_settle(),
            stale_threshold: defaults::stale_threshold(),
            stale_streaks: defaults::stale_streaks(),
        }
    }
}

impl CollectorConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle_ms)
    }

    pub fn initial_settle(&self) -> Duration {
        Duration::from_millis(self.initial_settle_ms)
    }

    /// Settings with every pause removed.
    pub fn without_pauses(mut self) -> Self {
        self.settle_ms = 0;
        self.click_settle_ms = 0;
        self.initial_settle_ms = 0;
        self
    }
}

/// Field extraction bounds. Lengths count `char`s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Comment body truncation
    #[serde(default = "defaults::max_text_chars")]
    pub max_text_chars: usize,

    /// Shorter body candidates are only kept as a last resort
    #[serde(default = "defaults::min_text_chars")]
    pub min_text_chars: usize,

    /// Author candidates must be shorter than this
    #[serde(default = "defaults::max_author_chars")]
    pub max_author_chars: usize,

    /// Replies kept per comment
    #[serde(default = "defaults::max_replies")]
    pub max_replies: usize,

    /// Reply truncation
    #[serde(default = "defaults::max_reply_chars")]
    pub max_reply_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_text_chars: defaults::max_text_chars(),
            min_text_chars: defaults::min_text_chars(),
            max_author_chars: defaults::max_author_chars(),
            max_replies: defaults::max_replies(),
            max_reply_chars: defaults::max_reply_chars(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Browser defaults
    pub fn webdriver_url() -> String {
        "http://localhost:9515".into()
    }
    pub fn user_data_dir() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default()
            .join(".harvester-profile")
    }
    pub fn window_width() -> u32 {
        1280
    }
    pub fn window_height() -> u32 {
        800
    }
    pub fn locale() -> String {
        "zh-CN".into()
    }
    pub fn navigation_timeout() -> u64 {
        60
    }
    pub fn login_timeout() -> u64 {
        300
    }
    pub fn login_poll() -> u64 {
        500
    }
    pub fn login_markers() -> Vec<String> {
        vec!["login".into()]
    }

    // Collector defaults
    pub fn max_rounds() -> usize {
        50
    }
    pub fn settle() -> u64 {
        1500
    }
    pub fn click_settle() -> u64 {
        1000
    }
    pub fn initial_settle() -> u64 {
        3000
    }
    pub fn stale_threshold() -> usize {
        5
    }
    pub fn stale_streaks() -> usize {
        1
    }

    // Extraction defaults
    pub fn max_text_chars() -> usize {
        500
    }
    pub fn min_text_chars() -> usize {
        3
    }
    pub fn max_author_chars() -> usize {
        30
    }
    pub fn max_replies() -> usize {
        5
    }
    pub fn max_reply_chars() -> usize {
        200
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_rounds() {
        let mut config = Config::default();
        config.collector.max_rounds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = Config::default();
        config.selectors.text.push("[[broken".to_string());
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_endpoint() {
        let mut config = Config::default();
        config.browser.webdriver_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.collector.max_rounds, 50);
        assert_eq!(config.collector.stale_threshold, 5);
        assert_eq!(config.collector.stale_streaks, 1);
        assert_eq!(config.extraction.max_text_chars, 500);
        assert_eq!(config.extraction.max_replies, 5);
        assert_eq!(config.extraction.max_reply_chars, 200);
        assert_eq!(config.browser.login_timeout_secs, 300);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [collector]
            max_rounds = 10

            [browser]
            headless = true
            "#,
        )
        .unwrap();
        assert_eq!(config.collector.max_rounds, 10);
        assert_eq!(config.collector.settle_ms, 1500);
        assert!(config.browser.headless);
        assert_eq!(config.browser.locale, "zh-CN");
    }

    #[test]
    fn login_gate_detection_is_case_insensitive() {
        let browser = BrowserConfig::default();
        assert!(browser.is_login_gate("https://www.xiaohongshu.com/LOGIN?redirect=x"));
        assert!(!browser.is_login_gate("https://www.xiaohongshu.com/explore/abc"));
    }
}
