//! Scripted in-memory page for tests.
//!
//! Serves HTML snapshots whose comment count follows a per-scroll script.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::browser::{Browser, Page};
use crate::error::{AppError, Result};

#[derive(Debug, Default)]
struct State {
    scrolls: usize,
    url: String,
    gate_polls: usize,
    gotos: Vec<String>,
    clicks: Vec<String>,
    closed: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedPage {
    counts: Vec<usize>,
    blank_nodes: Vec<usize>,
    fail_goto: bool,
    hang_goto: bool,
    fail_clicks: bool,
    fail_content: bool,
    state: Arc<Mutex<State>>,
}

impl ScriptedPage {
    /// `counts[i]` is the node count visible after scroll `i + 1`.
    pub fn new(counts: &[usize]) -> Self {
        Self {
            counts: counts.to_vec(),
            ..Self::default()
        }
    }

    /// Report a login URL for the next `polls` `current_url` calls.
    pub fn with_login_polls(self, polls: usize) -> Self {
        self.state.lock().unwrap().gate_polls = polls;
        self
    }

    /// Nodes (0-based) rendered without any text.
    pub fn with_blank_nodes(mut self, nodes: &[usize]) -> Self {
        self.blank_nodes = nodes.to_vec();
        self
    }

    pub fn failing_goto(mut self) -> Self {
        self.fail_goto = true;
        self
    }

    pub fn hanging_goto(mut self) -> Self {
        self.hang_goto = true;
        self
    }

    pub fn failing_clicks(mut self) -> Self {
        self.fail_clicks = true;
        self
    }

    pub fn failing_content(mut self) -> Self {
        self.fail_content = true;
        self
    }

    pub fn scrolls(&self) -> usize {
        self.state.lock().unwrap().scrolls
    }

    pub fn gotos(&self) -> Vec<String> {
        self.state.lock().unwrap().gotos.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn visible_count(&self, scrolls: usize) -> usize {
        if self.counts.is_empty() {
            return 0;
        }
        let idx = scrolls.saturating_sub(1).min(self.counts.len() - 1);
        self.counts[idx]
    }

    fn render(&self, count: usize) -> String {
        let mut html = String::from(
            "<html><head><title>笔记 - 小红书</title></head><body>\
             <h1>测试帖子</h1><div class=\"comments-container\">",
        );
        for i in 0..count {
            if self.blank_nodes.contains(&i) {
                html.push_str("<div class=\"comment-item\"><img src=\"sticker.png\"></div>");
                continue;
            }
            html.push_str(&format!(
                "<div class=\"comment-item\">\
                 <span class=\"nickname\">用户{i}</span>\
                 <div class=\"content\">第{i}条评论内容</div>\
                 <span class=\"like-count\">{i} 赞</span>\
                 </div>"
            ));
        }
        html.push_str("</div></body></html>");
        html
    }
}

#[async_trait]
impl Page for ScriptedPage {
    async fn goto(&self, url: &str) -> Result<()> {
        if self.hang_goto {
            std::future::pending::<()>().await;
        }
        let mut state = self.state.lock().unwrap();
        state.gotos.push(url.to_string());
        if self.fail_goto {
            return Err(AppError::webdriver(
                "unknown error",
                "net::ERR_NAME_NOT_RESOLVED",
            ));
        }
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        if state.gate_polls > 0 {
            state.gate_polls -= 1;
            return Ok("https://www.xiaohongshu.com/login?redirectPath=note".to_string());
        }
        Ok(state.url.clone())
    }

    async fn title(&self) -> Result<String> {
        Ok("笔记 - 小红书".to_string())
    }

    async fn content(&self) -> Result<String> {
        let scrolls = self.state.lock().unwrap().scrolls;
        if self.fail_content {
            return Err(AppError::webdriver("no such window", "target window already closed"));
        }
        Ok(self.render(self.visible_count(scrolls)))
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.state.lock().unwrap().scrolls += 1;
        Ok(())
    }

    async fn click_if_visible(&self, selector: &str) -> Result<bool> {
        if self.fail_clicks {
            return Err(AppError::webdriver(
                "element click intercepted",
                "other element would receive the click",
            ));
        }
        self.state.lock().unwrap().clicks.push(selector.to_string());
        Ok(true)
    }

    async fn close(&self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Hands out clones of one scripted page.
pub(crate) struct ScriptedBrowser {
    pub page: ScriptedPage,
}

#[async_trait]
impl Browser for ScriptedBrowser {
    async fn open(&self) -> Result<Box<dyn Page>> {
        Ok(Box::new(self.page.clone()))
    }
}
