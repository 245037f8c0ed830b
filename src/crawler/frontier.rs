//! Crawl frontier: the visit queue plus the visited set
//!
//! This module handles:
//! - FIFO queue of pages waiting to be fetched
//! - Dedup by normalized URL, recorded at enqueue time
//! - Depth and scope checks before anything enters the queue
//!
//! Only the coordinator mutates the frontier, and only between batches.
//! Tasks inside a batch get an immutable snapshot of the visited set.

use crate::config::CrawlConfig;
use crate::url::{is_in_scope, normalize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// A page accepted into the frontier, waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized URL
    pub url: String,

    /// Distance from the seed page
    pub depth: u32,

    /// URL of the page this link was found on (None for the seed)
    pub parent_url: Option<String>,
}

/// Read-only view of the visited set handed to in-flight tasks
pub type VisitedSnapshot = Arc<HashSet<String>>;

/// FIFO visit queue with a visited set
///
/// Ordering is relaxed breadth-first: children are appended only after a
/// whole batch completes, so a single batch may hold the tail of one depth
/// and the head of the next when batch size and layer size differ.
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    visited: VisitedSnapshot,
    config: Arc<CrawlConfig>,
}

impl Frontier {
    /// Creates an empty frontier bound to the given configuration
    pub fn new(config: Arc<CrawlConfig>) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: Arc::new(HashSet::new()),
            config,
        }
    }

    /// Attempts to accept a URL into the frontier
    ///
    /// The URL is normalized first. It is rejected, leaving the frontier
    /// untouched, when:
    /// - `depth` exceeds the configured maximum
    /// - it cannot be normalized
    /// - its normalized form was already accepted once
    /// - it is out of scope
    ///
    /// On acceptance the key goes into the visited set immediately, so the
    /// same link found on two sibling pages is only queued once.
    ///
    /// # Returns
    ///
    /// `true` if the URL was queued
    pub fn try_enqueue(&mut self, url: &str, depth: u32, parent_url: Option<&str>) -> bool {
        if depth > self.config.crawler.max_depth {
            tracing::trace!("Rejecting {} at depth {}: beyond max depth", url, depth);
            return false;
        }

        let key = match normalize(url) {
            Ok(key) => key,
            Err(e) => {
                tracing::trace!("Rejecting {}: {}", url, e);
                return false;
            }
        };

        if self.visited.contains(&key) {
            return false;
        }

        if !is_in_scope(&key, &self.config.scope) {
            tracing::trace!("Rejecting {}: out of scope", key);
            return false;
        }

        // Snapshots are dropped at the batch barrier, so this does not clone
        Arc::make_mut(&mut self.visited).insert(key.clone());
        self.queue.push_back(FrontierEntry {
            url: key,
            depth,
            parent_url: parent_url.map(str::to_string),
        });

        true
    }

    /// Removes and returns up to `n` entries in insertion order
    pub fn drain_batch(&mut self, n: usize) -> Vec<FrontierEntry> {
        let n = n.min(self.queue.len());
        self.queue.drain(..n).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of entries still waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Number of URLs ever accepted
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Whether a normalized URL has already been accepted
    pub fn is_visited(&self, key: &str) -> bool {
        self.visited.contains(key)
    }

    /// Cheap shared copy of the visited set for advisory filtering
    pub fn visited_snapshot(&self) -> VisitedSnapshot {
        Arc::clone(&self.visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config(max_depth: u32) -> Arc<CrawlConfig> {
        let mut config = CrawlConfig::default();
        config.crawler.max_depth = max_depth;
        config.scope.allowed_host = "docs.example.com".to_string();
        config.scope.allowed_path_prefixes = vec!["/iaas/".to_string()];
        Arc::new(config)
    }

    const SEED: &str = "https://docs.example.com/iaas/Content/a.htm";

    #[test]
    fn test_enqueue_and_drain() {
        let mut frontier = Frontier::new(create_test_config(2));
        assert!(frontier.try_enqueue(SEED, 0, None));
        assert_eq!(frontier.len(), 1);
        assert!(frontier.is_visited(SEED));

        let batch = frontier.drain_batch(10);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].url, SEED);
        assert_eq!(batch[0].depth, 0);
        assert_eq!(batch[0].parent_url, None);
        assert!(frontier.is_empty());

        // Still visited after being dequeued
        assert!(!frontier.try_enqueue(SEED, 1, None));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut frontier = Frontier::new(create_test_config(2));
        assert!(frontier.try_enqueue(SEED, 0, None));
        assert!(!frontier.try_enqueue(SEED, 1, Some(SEED)));
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier.visited_count(), 1);
    }

    #[test]
    fn test_query_variant_is_duplicate() {
        let mut frontier = Frontier::new(create_test_config(2));
        assert!(frontier.try_enqueue(SEED, 0, None));
        assert!(!frontier.try_enqueue(&format!("{}?utm_source=nav", SEED), 1, None));
        assert!(!frontier.try_enqueue(&format!("{}#section", SEED), 1, None));
    }

    #[test]
    fn test_depth_bound() {
        let mut frontier = Frontier::new(create_test_config(1));
        assert!(frontier.try_enqueue(SEED, 0, None));
        assert!(frontier.try_enqueue(
            "https://docs.example.com/iaas/Content/b.htm",
            1,
            Some(SEED)
        ));
        assert!(!frontier.try_enqueue(
            "https://docs.example.com/iaas/Content/c.htm",
            2,
            Some(SEED)
        ));
        assert_eq!(frontier.visited_count(), 2);
        assert!(!frontier.is_visited("https://docs.example.com/iaas/Content/c.htm"));
    }

    #[test]
    fn test_scope_rejection_leaves_visited_unchanged() {
        let mut frontier = Frontier::new(create_test_config(2));
        let out_of_scope = [
            "https://docs.example.com/iaas/guide.pdf",
            "https://elsewhere.example.com/iaas/a.htm",
            "https://docs.example.com/blog/a.htm",
            "not a url",
        ];
        for url in out_of_scope {
            assert!(!frontier.try_enqueue(url, 0, None), "accepted {}", url);
        }
        assert_eq!(frontier.visited_count(), 0);
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_drain_is_fifo_and_bounded() {
        let mut frontier = Frontier::new(create_test_config(3));
        for name in ["a", "b", "c", "d", "e"] {
            let url = format!("https://docs.example.com/iaas/{}.htm", name);
            assert!(frontier.try_enqueue(&url, 1, Some(SEED)));
        }

        let first = frontier.drain_batch(2);
        let urls: Vec<&str> = first.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://docs.example.com/iaas/a.htm",
                "https://docs.example.com/iaas/b.htm"
            ]
        );
        assert_eq!(frontier.len(), 3);

        let rest = frontier.drain_batch(10);
        assert_eq!(rest.len(), 3);
        assert_eq!(rest[0].url, "https://docs.example.com/iaas/c.htm");
        assert!(frontier.drain_batch(4).is_empty());
    }

    #[test]
    fn test_snapshot_is_frozen() {
        let mut frontier = Frontier::new(create_test_config(2));
        assert!(frontier.try_enqueue(SEED, 0, None));
        let snapshot = frontier.visited_snapshot();

        assert!(frontier.try_enqueue(
            "https://docs.example.com/iaas/Content/b.htm",
            1,
            Some(SEED)
        ));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(frontier.visited_count(), 2);
    }

    #[test]
    fn test_parent_recorded() {
        let mut frontier = Frontier::new(create_test_config(2));
        assert!(frontier.try_enqueue(
            "https://docs.example.com/iaas/Content/b.htm?x=1",
            1,
            Some(SEED)
        ));
        let batch = frontier.drain_batch(1);
        assert_eq!(batch[0].url, "https://docs.example.com/iaas/Content/b.htm");
        assert_eq!(batch[0].parent_url.as_deref(), Some(SEED));
    }
}
