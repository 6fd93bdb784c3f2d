// src/services/extractor.rs

//! Field extraction for a single comment node.
//!
//! Every field is resolved through its own ordered [`LocatorChain`]. A field
//! nobody can resolve keeps its default; only a missing body drops the node.

use scraper::ElementRef;

use crate::error::Result;
use crate::models::{CommentRecord, ExtractionConfig, SelectorConfig};
use crate::services::{Locator, LocatorChain, element_text};
use crate::utils::{char_len, first_number, truncate_chars};

/// Converts rendered comment nodes into [`CommentRecord`]s.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    text: LocatorChain,
    author: LocatorChain,
    likes: LocatorChain,
    published: LocatorChain,
    author_badge: Locator,
    replies: Locator,
    limits: ExtractionConfig,
}

impl FieldExtractor {
    /// Compile all field locators.
    pub fn new(selectors: &SelectorConfig, limits: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            text: LocatorChain::parse(&selectors.text)?,
            author: LocatorChain::parse(&selectors.author)?,
            likes: LocatorChain::parse(&selectors.likes)?,
            published: LocatorChain::parse(&selectors.published)?,
            author_badge: Locator::group(&selectors.author_badge)?,
            replies: Locator::group(&selectors.replies)?,
            limits: limits.clone(),
        })
    }

    /// Build a record for `node`, or `None` when no body text can be found.
    pub fn extract(&self, node: ElementRef<'_>, index: usize) -> Option<CommentRecord> {
        let text = self.text(node)?;

        Some(CommentRecord {
            index,
            author: self.author(node).unwrap_or_default(),
            text,
            like_count: self.like_count(node).unwrap_or(0),
            published_at: self.published.first_non_empty(node).unwrap_or_default(),
            is_author_reply: self.author_badge.matches_any(node),
            replies: self.replies(node),
        })
    }

    /// First candidate with at least `min_text_chars` chars. Failing that,
    /// the first non-empty short candidate.
    fn text(&self, node: ElementRef<'_>) -> Option<String> {
        let mut short = None;
        let long = self.text.resolve(node, |text| {
            if char_len(&text) >= self.limits.min_text_chars {
                Some(text)
            } else {
                if short.is_none() && !text.is_empty() {
                    short = Some(text);
                }
                None
            }
        });

        long.or(short)
            .map(|text| truncate_chars(&text, self.limits.max_text_chars))
    }

    fn author(&self, node: ElementRef<'_>) -> Option<String> {
        let max = self.limits.max_author_chars;
        self.author
            .resolve(node, |name| (!name.is_empty() && char_len(&name) < max).then_some(name))
    }

    fn like_count(&self, node: ElementRef<'_>) -> Option<u64> {
        self.likes.resolve(node, |text| first_number(&text))
    }

    /// Text of the first `max_replies` reply matches; blank ones are skipped,
    /// not replaced.
    fn replies(&self, node: ElementRef<'_>) -> Vec<String> {
        self.replies
            .all(node)
            .take(self.limits.max_replies)
            .map(element_text)
            .filter(|reply| !reply.is_empty())
            .map(|reply| truncate_chars(&reply, self.limits.max_reply_chars))
            .collect()
    }
}
