//! Crawl statistics
//!
//! This module provides the counters the coordinator keeps while crawling
//! and the summary printed at the end of a run.

use crate::FetchError;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

/// Counters for a single crawl run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStats {
    /// Number of page records produced
    pub pages_recorded: u64,

    /// Fetch failures keyed by [`FetchError::kind`]
    pub failures_by_kind: BTreeMap<&'static str, u64>,

    /// Tasks that panicked or were aborted without producing a result
    pub dropped_tasks: u64,

    /// Page records per depth
    pub pages_by_depth: BTreeMap<u32, u64>,

    /// URLs accepted into the frontier over the whole run
    pub urls_visited: u64,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,

    /// Whether the crawl stopped on a cancellation request
    pub cancelled: bool,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&mut self, depth: u32) {
        self.pages_recorded += 1;
        *self.pages_by_depth.entry(depth).or_insert(0) += 1;
    }

    pub fn record_failure(&mut self, error: &FetchError) {
        *self.failures_by_kind.entry(error.kind()).or_insert(0) += 1;
    }

    pub fn record_dropped_task(&mut self) {
        self.dropped_tasks += 1;
    }

    /// Fetch failures plus dropped tasks
    pub fn total_failures(&self) -> u64 {
        self.failures_by_kind.values().sum::<u64>() + self.dropped_tasks
    }

    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.pages_recorded as f64 / secs
        } else {
            0.0
        }
    }
}

/// Renders the statistics summary
pub fn format_statistics(stats: &CrawlStats) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Crawl Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Pages recorded: {}", stats.pages_recorded);
    let _ = writeln!(out, "  URLs visited: {}", stats.urls_visited);
    let _ = writeln!(out, "  Failures: {}", stats.total_failures());
    let _ = writeln!(
        out,
        "  Elapsed: {:.2}s ({:.2} pages/sec)",
        stats.elapsed.as_secs_f64(),
        stats.pages_per_second()
    );
    if stats.cancelled {
        let _ = writeln!(out, "  Stopped early: cancelled");
    }
    let _ = writeln!(out);

    if !stats.pages_by_depth.is_empty() {
        let _ = writeln!(out, "Pages by Depth:");
        for (depth, count) in &stats.pages_by_depth {
            let _ = writeln!(out, "  Level {}: {}", depth, count);
        }
        let _ = writeln!(out);
    }

    if stats.total_failures() > 0 {
        let _ = writeln!(out, "Failure Summary:");
        // Sort by count (descending)
        let mut failure_counts: Vec<_> = stats.failures_by_kind.iter().collect();
        failure_counts.sort_by(|a, b| b.1.cmp(a.1));
        for (kind, count) in failure_counts {
            let _ = writeln!(out, "  {}: {}", kind, count);
        }
        if stats.dropped_tasks > 0 {
            let _ = writeln!(out, "  dropped tasks: {}", stats.dropped_tasks);
        }
        let _ = writeln!(out);
    }

    let attempted = stats.pages_recorded + stats.total_failures();
    let success_rate = if attempted > 0 {
        (stats.pages_recorded as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };
    let _ = writeln!(
        out,
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        success_rate, stats.pages_recorded, attempted
    );

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    print!("{}", format_statistics(stats));
}
