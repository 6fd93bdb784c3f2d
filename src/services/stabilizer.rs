// src/services/stabilizer.rs

//! Scroll-and-settle loop that grows the lazily rendered comment list.
//!
//! Each round scrolls, opportunistically clicks "load more", waits, then
//! re-runs node discovery on a fresh snapshot. A round whose count equals the
//! previous round's is stale; `stale_threshold` stale rounds in a row make a
//! streak, and `stale_streaks` streaks end the loop early. Otherwise the loop
//! runs until the round budget is spent. Neither ending is an error.

use crate::browser::Page;
use crate::models::{CollectorConfig, SelectorConfig};
use crate::services::{NodeDiscovery, opportunistic};

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Node count stopped growing
    Converged,
    /// Round budget spent
    Exhausted,
}

/// Summary of one stabilization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilizeOutcome {
    pub rounds: usize,
    pub last_count: usize,
    pub reason: StopReason,
}

/// Stale-round bookkeeping, kept apart from page I/O.
#[derive(Debug, Clone)]
pub struct StaleTracker {
    threshold: usize,
    streaks_needed: usize,
    last_count: usize,
    stale: usize,
    streaks: usize,
}

impl StaleTracker {
    pub fn new(threshold: usize, streaks_needed: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            streaks_needed: streaks_needed.max(1),
            last_count: 0,
            stale: 0,
            streaks: 0,
        }
    }

    /// Record one round's count. Returns `true` when the loop should stop.
    pub fn observe(&mut self, count: usize) -> bool {
        if count == self.last_count {
            self.stale += 1;
        } else {
            self.stale = 0;
        }
        self.last_count = count;

        if self.stale >= self.threshold {
            self.streaks += 1;
            self.stale = 0;
            return self.streaks >= self.streaks_needed;
        }
        false
    }

    pub fn last_count(&self) -> usize {
        self.last_count
    }
}

/// Drives a page until its comment list stops growing.
pub struct Stabilizer<'a> {
    discovery: &'a NodeDiscovery,
    config: &'a CollectorConfig,
    load_more: String,
}

impl<'a> Stabilizer<'a> {
    pub fn new(
        discovery: &'a NodeDiscovery,
        config: &'a CollectorConfig,
        selectors: &SelectorConfig,
    ) -> Self {
        Self {
            discovery,
            config,
            load_more: SelectorConfig::group(&selectors.load_more),
        }
    }

    /// Run at most `max_rounds` rounds.
    ///
    /// Page faults inside a round never abort the loop: a failed scroll or
    /// click is skipped, a failed snapshot repeats the previous count.
    pub async fn stabilize(&self, page: &dyn Page, max_rounds: usize) -> StabilizeOutcome {
        let mut tracker = StaleTracker::new(self.config.stale_threshold, self.config.stale_streaks);

        for round in 1..=max_rounds {
            opportunistic("scroll", page.scroll_to_bottom()).await;
            tokio::time::sleep(self.config.settle()).await;

            if opportunistic("load more", page.click_if_visible(&self.load_more))
                .await
                .unwrap_or(false)
            {
                tokio::time::sleep(self.config.click_settle()).await;
            }

            let count = match opportunistic("snapshot", page.content()).await {
                Some(html) => self.discovery.count(&html),
                None => tracker.last_count(),
            };
            log::info!("Round {}/{}: {} comments visible", round, max_rounds, count);

            if tracker.observe(count) {
                log::info!(
                    "No new comments for {} rounds, stopping",
                    self.config.stale_threshold
                );
                return StabilizeOutcome {
                    rounds: round,
                    last_count: count,
                    reason: StopReason::Converged,
                };
            }
        }

        StabilizeOutcome {
            rounds: max_rounds,
            last_count: tracker.last_count(),
            reason: StopReason::Exhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::scripted::ScriptedPage;

    fn run_tracker(counts: &[usize], threshold: usize, streaks: usize) -> Option<usize> {
        let mut tracker = StaleTracker::new(threshold, streaks);
        counts
            .iter()
            .position(|&c| tracker.observe(c))
            .map(|idx| idx + 1)
    }

    #[test]
    fn test_tracker_stops_after_five_stale_rounds() {
        assert_eq!(run_tracker(&[3, 3, 3, 3, 3, 3], 5, 1), Some(6));
    }

    #[test]
    fn test_tracker_growth_resets_stale() {
        assert_eq!(run_tracker(&[1, 2, 2, 2, 3, 3, 3, 3], 5, 1), None);
        assert_eq!(run_tracker(&[1, 2, 2, 2, 3, 3, 3, 3, 3, 3], 5, 1), Some(10));
    }

    #[test]
    fn test_tracker_non_monotonic_counts_are_growth() {
        // A reflow that shrinks the list is a change, not a stale round.
        assert_eq!(run_tracker(&[5, 5, 4, 4, 4, 4, 4], 5, 1), None);
    }

    #[test]
    fn test_tracker_empty_page_converges() {
        assert_eq!(run_tracker(&[0, 0, 0, 0, 0], 5, 1), Some(5));
    }

    #[test]
    fn test_tracker_two_streaks() {
        assert_eq!(run_tracker(&[3, 3, 3, 3, 3, 3], 5, 2), None);
        assert_eq!(run_tracker(&[3; 11], 5, 2), Some(11));
    }

    fn setup() -> (NodeDiscovery, CollectorConfig, SelectorConfig) {
        let selectors = SelectorConfig::default();
        let discovery = NodeDiscovery::new(&selectors.nodes).unwrap();
        (discovery, CollectorConfig::default().without_pauses(), selectors)
    }

    #[tokio::test]
    async fn test_stops_early_when_stable() {
        let (discovery, config, selectors) = setup();
        let page = ScriptedPage::new(&[3, 3, 3, 3, 3, 3]);

        let outcome = Stabilizer::new(&discovery, &config, &selectors)
            .stabilize(&page, 50)
            .await;

        assert_eq!(outcome.reason, StopReason::Converged);
        assert_eq!(outcome.rounds, 6);
        assert_eq!(outcome.last_count, 3);
        assert_eq!(page.scrolls(), 6);
    }

    #[tokio::test]
    async fn test_exhausts_round_budget_while_growing() {
        let (discovery, config, selectors) = setup();
        let page = ScriptedPage::new(&[2, 4, 6, 8, 10, 12, 14, 16]);

        let outcome = Stabilizer::new(&discovery, &config, &selectors)
            .stabilize(&page, 4)
            .await;

        assert_eq!(outcome.reason, StopReason::Exhausted);
        assert_eq!(outcome.rounds, 4);
        assert_eq!(outcome.last_count, 8);
        assert_eq!(page.scrolls(), 4);
    }

    #[tokio::test]
    async fn test_click_failures_do_not_abort() {
        let (discovery, config, selectors) = setup();
        let page = ScriptedPage::new(&[1, 2, 2, 2, 2, 2, 2]).failing_clicks();

        let outcome = Stabilizer::new(&discovery, &config, &selectors)
            .stabilize(&page, 50)
            .await;

        assert_eq!(outcome.reason, StopReason::Converged);
        assert_eq!(outcome.rounds, 7);
    }

    #[tokio::test]
    async fn test_load_more_clicked_each_round() {
        let (discovery, config, selectors) = setup();
        let page = ScriptedPage::new(&[1, 2, 3]);

        Stabilizer::new(&discovery, &config, &selectors)
            .stabilize(&page, 3)
            .await;

        let clicks = page.clicks();
        assert_eq!(clicks.len(), 3);
        assert!(clicks.iter().all(|c| c.contains(".load-more")));
    }

    #[tokio::test]
    async fn test_failed_snapshots_count_as_stale() {
        let (discovery, config, selectors) = setup();
        let page = ScriptedPage::new(&[9]).failing_content();

        let outcome = Stabilizer::new(&discovery, &config, &selectors)
            .stabilize(&page, 50)
            .await;

        assert_eq!(outcome.reason, StopReason::Converged);
        assert_eq!(outcome.rounds, 5);
        assert_eq!(outcome.last_count, 0);
    }
}
