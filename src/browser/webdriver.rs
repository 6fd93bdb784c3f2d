// src/browser/webdriver.rs

//! W3C WebDriver client (chromedriver compatible).
//!
//! Speaks the JSON wire protocol directly over HTTP. Chrome is launched with a
//! persistent profile directory so a manual login survives between runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::browser::{Browser, Page};
use crate::error::{AppError, Result};
use crate::models::BrowserConfig;

/// W3C web element identifier key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Extra headroom over the page-load timeout for a single HTTP round trip.
const REQUEST_SLACK: Duration = Duration::from_secs(30);

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

#[derive(Deserialize)]
struct Envelope<T> {
    value: T,
}

#[derive(Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSession {
    session_id: String,
}

/// Send one WebDriver command and unwrap the `value` envelope.
async fn send<T: DeserializeOwned>(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<T> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        return Err(match serde_json::from_slice::<Envelope<WireError>>(&bytes) {
            Ok(envelope) => AppError::webdriver(envelope.value.error, envelope.value.message),
            Err(_) => AppError::webdriver(
                status.as_str(),
                String::from_utf8_lossy(&bytes).into_owned(),
            ),
        });
    }

    let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
    Ok(envelope.value)
}

/// Launches Chrome sessions through a WebDriver endpoint.
pub struct WebDriverBrowser {
    client: Client,
    endpoint: String,
    config: BrowserConfig,
}

impl WebDriverBrowser {
    pub fn new(config: &BrowserConfig) -> Result<Self> {
        let endpoint = url::Url::parse(&config.webdriver_url)?;
        let client = Client::builder()
            .timeout(config.navigation_timeout() + REQUEST_SLACK)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.as_str().trim_end_matches('/').to_string(),
            config: config.clone(),
        })
    }

    fn capabilities(&self) -> Value {
        let config = &self.config;
        let mut args = vec![
            format!("--user-data-dir={}", config.user_data_dir.display()),
            format!("--window-size={},{}", config.window_width, config.window_height),
            format!("--lang={}", config.locale),
        ];
        if config.headless {
            args.push("--headless=new".to_string());
        }

        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "timeouts": {
                        "pageLoad": config.navigation_timeout().as_millis() as u64
                    },
                    "goog:chromeOptions": {
                        "args": args,
                        "prefs": { "intl.accept_languages": config.locale }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn open(&self) -> Result<Box<dyn Page>> {
        tokio::fs::create_dir_all(&self.config.user_data_dir).await?;

        let url = format!("{}/session", self.endpoint);
        let session: NewSession = send(&self.client, Method::POST, &url, Some(self.capabilities()))
            .await
            .map_err(|e| AppError::browser(format!("{} ({})", e, self.endpoint)))?;

        log::debug!("Opened WebDriver session {}", session.session_id);
        Ok(Box::new(WebDriverPage::new(
            self.client.clone(),
            &self.endpoint,
            &session.session_id,
        )))
    }
}

/// A live WebDriver session.
///
/// Dropping a page that was never closed schedules a best-effort session
/// delete on the current Tokio runtime.
pub struct WebDriverPage {
    client: Client,
    session_url: String,
    closed: AtomicBool,
}

impl WebDriverPage {
    fn new(client: Client, endpoint: &str, session_id: &str) -> Self {
        Self {
            client,
            session_url: format!("{endpoint}/session/{session_id}"),
            closed: AtomicBool::new(false),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.session_url, path);
        send(&self.client, Method::GET, &url, None).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        let url = format!("{}{}", self.session_url, path);
        send(&self.client, Method::POST, &url, Some(body)).await
    }

    /// Element id of the first match, `None` if nothing matches.
    async fn find(&self, selector: &str) -> Result<Option<String>> {
        let found: Result<HashMap<String, String>> = self
            .post("/element", json!({ "using": "css selector", "value": selector }))
            .await;

        match found {
            Ok(mut reference) => Ok(reference.remove(ELEMENT_KEY)),
            Err(AppError::WebDriver { error, .. }) if error == "no such element" => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn goto(&self, url: &str) -> Result<()> {
        let _: Value = self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.get("/url").await
    }

    async fn title(&self) -> Result<String> {
        self.get("/title").await
    }

    async fn content(&self) -> Result<String> {
        self.get("/source").await
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        let _: Value = self
            .post(
                "/execute/sync",
                json!({ "script": SCROLL_SCRIPT, "args": [] }),
            )
            .await?;
        Ok(())
    }

    async fn click_if_visible(&self, selector: &str) -> Result<bool> {
        let Some(element) = self.find(selector).await? else {
            return Ok(false);
        };

        let displayed: bool = self.get(&format!("/element/{element}/displayed")).await?;
        if !displayed {
            return Ok(false);
        }

        let _: Value = self.post(&format!("/element/{element}/click"), json!({})).await?;
        Ok(true)
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let _: Value = send(&self.client, Method::DELETE, &self.session_url, None).await?;
        log::debug!("Closed WebDriver session {}", self.session_url);
        Ok(())
    }
}

impl Drop for WebDriverPage {
    fn drop(&mut self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let client = self.client.clone();
            let url = self.session_url.clone();
            log::warn!("Session dropped without close, deleting {}", url);
            handle.spawn(async move {
                let _ = client.delete(url).send().await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_follow_config() {
        let config = BrowserConfig {
            headless: true,
            ..BrowserConfig::default()
        };
        let browser = WebDriverBrowser::new(&config).unwrap();
        let caps = browser.capabilities();
        let args = caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap();

        assert!(args.iter().any(|a| a == "--headless=new"));
        assert!(args.iter().any(|a| a == "--window-size=1280,800"));
        assert!(args.iter().any(|a| a == "--lang=zh-CN"));
        assert_eq!(caps["capabilities"]["alwaysMatch"]["timeouts"]["pageLoad"], 60_000);
    }

    #[test]
    fn test_visible_mode_has_no_headless_flag() {
        let browser = WebDriverBrowser::new(&BrowserConfig::default()).unwrap();
        let caps = browser.capabilities();
        let args = caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap();
        assert!(!args.iter().any(|a| a == "--headless=new"));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let config = BrowserConfig {
            webdriver_url: "http://127.0.0.1:4444/".to_string(),
            ..BrowserConfig::default()
        };
        let browser = WebDriverBrowser::new(&config).unwrap();
        assert_eq!(browser.endpoint, "http://127.0.0.1:4444");
    }

    #[test]
    fn test_error_envelope_parses() {
        let body = br#"{"value":{"error":"no such element","message":"gone","stacktrace":""}}"#;
        let envelope: Envelope<WireError> = serde_json::from_slice(body).unwrap();
        assert_eq!(envelope.value.error, "no such element");
        assert_eq!(envelope.value.message, "gone");
    }

    #[test]
    fn test_new_session_parses() {
        let body = br#"{"value":{"sessionId":"abc123","capabilities":{}}}"#;
        let envelope: Envelope<NewSession> = serde_json::from_slice(body).unwrap();
        assert_eq!(envelope.value.session_id, "abc123");
    }
}
