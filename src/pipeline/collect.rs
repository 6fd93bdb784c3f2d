// src/pipeline/collect.rs

//! Comment collection pipeline.
//!
//! Sequence: open page -> navigate (wait out a login gate) -> resolve title ->
//! click "expand comments" -> stabilize -> discover -> extract each node.
//!
//! Only a failed navigation to the target and an expired login wait abort a
//! run. The browser session is closed on every exit path.

use std::sync::Arc;

use scraper::Html;

use crate::browser::{Browser, Page, WebDriverBrowser};
use crate::error::{AppError, Result};
use crate::models::{CollectionResult, CommentRecord, Config, SelectorConfig};
use crate::services::{FieldExtractor, Locator, NodeDiscovery, Stabilizer, opportunistic};

/// Orchestrates one collection run per call.
pub struct Collector<B: Browser> {
    browser: B,
    config: Arc<Config>,
    discovery: NodeDiscovery,
    extractor: FieldExtractor,
    title: Locator,
}

impl<B: Browser> Collector<B> {
    /// Compile all locators up front; a bad selector fails here, not mid-run.
    pub fn new(browser: B, config: Arc<Config>) -> Result<Self> {
        let selectors = &config.selectors;
        Ok(Self {
            discovery: NodeDiscovery::new(&selectors.nodes)?,
            extractor: FieldExtractor::new(selectors, &config.extraction)?,
            title: Locator::group(&selectors.title)?,
            browser,
            config,
        })
    }

    /// Collect all comments reachable from `url`.
    pub async fn collect(&self, url: &str, max_rounds: usize) -> Result<CollectionResult> {
        self.collect_until(url, max_rounds, std::future::pending()).await
    }

    /// Like [`collect`](Self::collect), but gives up with
    /// [`AppError::Cancelled`] as soon as `cancel` completes.
    pub async fn collect_until(
        &self,
        url: &str,
        max_rounds: usize,
        cancel: impl Future<Output = ()>,
    ) -> Result<CollectionResult> {
        url::Url::parse(url).map_err(|e| AppError::navigation(url, e))?;

        let page = self.browser.open().await?;
        let outcome = tokio::select! {
            result = self.run(page.as_ref(), url, max_rounds) => result,
            _ = cancel => Err(AppError::Cancelled),
        };

        if let Err(e) = page.close().await {
            log::warn!("Failed to close browser session: {}", e);
        }
        outcome
    }

    async fn run(&self, page: &dyn Page, url: &str, max_rounds: usize) -> Result<CollectionResult> {
        self.navigate(page, url).await?;

        let landed = opportunistic("read url", page.current_url())
            .await
            .unwrap_or_default();
        if self.config.browser.is_login_gate(&landed) {
            self.wait_for_login(page).await?;
            self.navigate(page, url).await?;
        }

        let title = self.resolve_title(page).await;
        log::info!("Post title: {}", title);

        let expand = SelectorConfig::group(&self.config.selectors.expand);
        if opportunistic("expand comments", page.click_if_visible(&expand))
            .await
            .unwrap_or(false)
        {
            tokio::time::sleep(self.config.collector.click_settle()).await;
        }

        let outcome = Stabilizer::new(&self.discovery, &self.config.collector, &self.config.selectors)
            .stabilize(page, max_rounds)
            .await;
        log::debug!(
            "Stabilization ended after {} rounds ({:?})",
            outcome.rounds,
            outcome.reason
        );

        let comments = match opportunistic("final snapshot", page.content()).await {
            Some(html) => self.extract_all(&html),
            None => {
                log::warn!("Could not read the final page snapshot, no comments extracted");
                Vec::new()
            }
        };

        Ok(CollectionResult::new(url, title, comments))
    }

    /// Navigate and let the page settle. Any failure here is fatal.
    async fn navigate(&self, page: &dyn Page, url: &str) -> Result<()> {
        let browser = &self.config.browser;
        log::info!("Navigating to {}", url);

        match tokio::time::timeout(browser.navigation_timeout(), page.goto(url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(AppError::navigation(url, e)),
            Err(_) => {
                return Err(AppError::navigation(
                    url,
                    format!("timed out after {}s", browser.navigation_timeout_secs),
                ));
            }
        }

        tokio::time::sleep(self.config.collector.initial_settle()).await;
        Ok(())
    }

    /// Poll the page URL until it leaves the login gate.
    async fn wait_for_login(&self, page: &dyn Page) -> Result<()> {
        let browser = &self.config.browser;
        log::warn!(
            "Login required. Log in through the browser window; waiting up to {}s",
            browser.login_timeout_secs
        );
        if browser.headless {
            log::warn!("Browser is headless, a manual login is not possible in this mode");
        }

        let poll = async {
            loop {
                tokio::time::sleep(browser.login_poll()).await;
                match page.current_url().await {
                    Ok(current) if !browser.is_login_gate(&current) => break,
                    Ok(_) => {}
                    Err(e) => log::debug!("Login poll failed: {}", e),
                }
            }
        };

        tokio::time::timeout(browser.login_timeout(), poll)
            .await
            .map_err(|_| AppError::LoginTimeout {
                waited_secs: browser.login_timeout_secs,
            })?;

        log::info!("Login detected, reloading the post");
        Ok(())
    }

    /// First title candidate in document order, then the document title,
    /// else empty.
    async fn resolve_title(&self, page: &dyn Page) -> String {
        if let Some(html) = opportunistic("title snapshot", page.content()).await {
            if let Some(title) = self.title_from(&html) {
                return title;
            }
        }
        opportunistic("document title", page.title())
            .await
            .unwrap_or_default()
    }

    fn title_from(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        self.title
            .first_text(document.root_element())
            .filter(|title| !title.is_empty())
    }

    /// Extract every discovered node, numbering accepted records from 1.
    fn extract_all(&self, html: &str) -> Vec<CommentRecord> {
        let document = Html::parse_document(html);
        let nodes = self.discovery.discover(&document);
        log::info!("Extracting {} comment nodes", nodes.len());

        let mut records = Vec::with_capacity(nodes.len());
        for (position, node) in nodes.into_iter().enumerate() {
            match self.extractor.extract(node, records.len() + 1) {
                Some(record) => records.push(record),
                None => log::debug!("Node {} has no text, skipped", position + 1),
            }
        }
        records
    }
}

/// Run one collection against the configured WebDriver endpoint.
pub async fn run_collector(
    config: Arc<Config>,
    url: &str,
    max_rounds: usize,
    cancel: impl Future<Output = ()>,
) -> Result<CollectionResult> {
    let browser = WebDriverBrowser::new(&config.browser)?;
    let collector = Collector::new(browser, Arc::clone(&config))?;

    let result = collector.collect_until(url, max_rounds, cancel).await?;
    log::info!("Collected {} comments from {}", result.total_comments, url);
    Ok(result)
}
