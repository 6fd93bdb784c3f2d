//! Comment node discovery.
//!
//! Page markup is third-party and changes without notice, so the container
//! nodes are located through an ordered list of strategies. The first strategy
//! that matches anything decides the node set; later strategies are not tried.

use scraper::{ElementRef, Html};

use crate::error::Result;
use crate::services::Locator;

/// Locates comment container nodes in an HTML snapshot.
#[derive(Debug, Clone)]
pub struct NodeDiscovery {
    strategies: Vec<Locator>,
}

impl NodeDiscovery {
    /// Compile discovery strategies, highest priority first.
    pub fn new(strategies: &[String]) -> Result<Self> {
        let strategies = strategies
            .iter()
            .map(|s| Locator::parse(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { strategies })
    }

    /// Nodes found by the first strategy with a non-empty result.
    ///
    /// An empty vector is a valid outcome, not an error.
    pub fn discover<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        self.strategies
            .iter()
            .find_map(|strategy| {
                let nodes = strategy.select_in(document);
                if nodes.is_empty() {
                    None
                } else {
                    log::trace!("Strategy '{}' matched {} nodes", strategy.source(), nodes.len());
                    Some(nodes)
                }
            })
            .unwrap_or_default()
    }

    /// Number of nodes discoverable in a raw HTML snapshot.
    pub fn count(&self, html: &str) -> usize {
        let document = Html::parse_document(html);
        self.discover(&document).len()
    }
}
