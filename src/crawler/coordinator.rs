//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop, including:
//! - Validating and seeding the frontier
//! - Draining the frontier in batches of at most `max_concurrency` pages
//! - Running fetch + extract for a batch on a `JoinSet`
//! - Recording results and enqueueing children at the batch barrier
//! - Honoring cancellation between and during batches
//!
//! Only the coordinator touches the frontier and the page store. Tasks get
//! shared read-only handles and return their result as a value.

use crate::config::{validate, CrawlConfig};
use crate::crawler::extractor::{Document, Extractor};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::output::CrawlStats;
use crate::store::{PageRecord, PageStore};
use crate::url::{is_url_in_scope, normalize_url};
use crate::{DocsMapperError, FetchError, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Lifecycle of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    /// Batches are being drawn from a non-empty frontier
    Running,

    /// The frontier is empty (or the run was cancelled) and the last batch
    /// is being collected
    Draining,

    /// No further work will be scheduled
    Done,
}

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub store: PageStore,
    pub stats: CrawlStats,
}

/// Results collected at one batch barrier
struct BatchOutcome {
    results: Vec<std::result::Result<PageRecord, FetchError>>,
    dropped: u64,
    cancelled: bool,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<CrawlConfig>,
    frontier: Frontier,
    store: PageStore,
    fetcher: Arc<Fetcher>,
    extractor: Arc<Extractor>,
    cancel: CancellationToken,
    phase: CrawlPhase,
    stats: CrawlStats,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration; validated here
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(DocsMapperError)` - Invalid configuration or HTTP client setup failure
    pub fn new(config: CrawlConfig) -> Result<Self> {
        validate(&config)?;

        let extractor = Extractor::new(&config.selectors)?;
        let fetcher = Fetcher::new(&config)?;
        let config = Arc::new(config);

        Ok(Self {
            frontier: Frontier::new(Arc::clone(&config)),
            config,
            store: PageStore::new(),
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(extractor),
            cancel: CancellationToken::new(),
            phase: CrawlPhase::Running,
            stats: CrawlStats::new(),
        })
    }

    /// Replaces the cancellation token with one owned by the caller
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that stops this crawl when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Runs the crawl from `seed` to completion or cancellation
    ///
    /// # Crawl Loop
    ///
    /// 1. Take up to `max_concurrency` entries from the frontier
    /// 2. Spawn one fetch + extract task per entry
    /// 3. Wait for the whole batch (or cancellation)
    /// 4. Append successes to the store and offer their children to the
    ///    frontier at `depth + 1`
    /// 5. Repeat until the frontier is empty
    ///
    /// Per-page failures are logged and counted, never returned.
    ///
    /// # Errors
    ///
    /// `InvalidSeedUrl` if the seed does not parse or is out of scope. No
    /// request is made in that case.
    pub async fn run(mut self, seed: &str) -> Result<CrawlReport> {
        let seed_key = self.validate_seed(seed)?;
        if !self.frontier.try_enqueue(&seed_key, 0, None) {
            return Err(DocsMapperError::InvalidSeedUrl {
                url: seed.to_string(),
                reason: "rejected by the frontier".to_string(),
            });
        }

        tracing::info!(
            "Starting crawl from {} (max depth {}, concurrency {})",
            seed_key,
            self.config.crawler.max_depth,
            self.fetcher.max_concurrency()
        );

        let start_time = Instant::now();
        self.set_phase(CrawlPhase::Running);

        while !self.frontier.is_empty() {
            if self.cancel.is_cancelled() {
                tracing::info!("Cancellation requested, stopping before next batch");
                self.stats.cancelled = true;
                break;
            }

            let batch_size = self.fetcher.max_concurrency().min(self.frontier.len());
            let entries = self.frontier.drain_batch(batch_size);
            let batch_depth = entries.iter().map(|e| e.depth).max().unwrap_or(0);

            if self.frontier.is_empty() {
                self.set_phase(CrawlPhase::Draining);
            }

            let outcome = self.run_batch(entries).await;
            self.collect(outcome);

            tracing::info!(
                "Progress: {} pages done, {} queued, {} visited, depth {}",
                self.store.len(),
                self.frontier.len(),
                self.frontier.visited_count(),
                batch_depth
            );

            if self.stats.cancelled {
                break;
            }
            if !self.frontier.is_empty() {
                self.set_phase(CrawlPhase::Running);
            }
        }

        self.set_phase(CrawlPhase::Done);

        self.stats.urls_visited = self.frontier.visited_count() as u64;
        self.stats.elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl completed: {} pages recorded, {} failures in {:?}",
            self.stats.pages_recorded,
            self.stats.total_failures(),
            self.stats.elapsed
        );

        Ok(CrawlReport {
            store: self.store,
            stats: self.stats,
        })
    }

    /// Checks the seed and returns its normalized form
    fn validate_seed(&self, seed: &str) -> Result<String> {
        let invalid = |reason: String| DocsMapperError::InvalidSeedUrl {
            url: seed.to_string(),
            reason,
        };

        let parsed = Url::parse(seed.trim()).map_err(|e| invalid(e.to_string()))?;

        if !is_url_in_scope(&parsed, &self.config.scope) {
            return Err(invalid(format!(
                "outside the crawl scope (host {}, path prefixes {:?})",
                self.config.scope.allowed_host, self.config.scope.allowed_path_prefixes
            )));
        }

        let normalized = normalize_url(parsed).map_err(|e| invalid(e.to_string()))?;
        Ok(normalized.to_string())
    }

    /// Fetches one batch concurrently and waits for all of it
    ///
    /// If cancellation fires first, outstanding tasks are aborted and only
    /// results that had already completed are returned.
    async fn run_batch(&self, entries: Vec<FrontierEntry>) -> BatchOutcome {
        let visited = self.frontier.visited_snapshot();
        let mut tasks = JoinSet::new();

        for entry in entries {
            let fetcher = Arc::clone(&self.fetcher);
            let extractor = Arc::clone(&self.extractor);
            let config = Arc::clone(&self.config);
            let visited = Arc::clone(&visited);
            tasks.spawn(async move { fetch_page(entry, &fetcher, &extractor, &config, &visited).await });
        }
        // The frontier may only grow again once every snapshot is released
        drop(visited);

        let cancel = self.cancel.clone();
        let mut outcome = BatchOutcome {
            results: Vec::new(),
            dropped: 0,
            cancelled: false,
        };

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    outcome.cancelled = true;
                    break;
                }
                joined = tasks.join_next() => match joined {
                    Some(Ok(result)) => outcome.results.push(result),
                    Some(Err(e)) => {
                        tracing::warn!("Crawl task failed: {}", e);
                        outcome.dropped += 1;
                    }
                    None => break,
                },
            }
        }

        if outcome.cancelled {
            tasks.abort_all();
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    // Finished before the abort landed
                    Ok(result) => outcome.results.push(result),
                    Err(e) if e.is_cancelled() => outcome.dropped += 1,
                    Err(e) => {
                        tracing::warn!("Crawl task failed: {}", e);
                        outcome.dropped += 1;
                    }
                }
            }
        }

        outcome
    }

    /// Applies a batch's results: store records, tally failures, enqueue children
    fn collect(&mut self, outcome: BatchOutcome) {
        if outcome.cancelled {
            self.stats.cancelled = true;
            tracing::info!(
                "Cancellation requested, {} in-flight pages abandoned",
                outcome.dropped
            );
        }

        for _ in 0..outcome.dropped {
            self.stats.record_dropped_task();
        }

        for result in outcome.results {
            match result {
                Ok(record) => {
                    if !outcome.cancelled {
                        let child_depth = record.depth + 1;
                        let mut queued = 0;
                        for child in &record.child_urls {
                            if self.frontier.try_enqueue(child, child_depth, Some(&record.url)) {
                                queued += 1;
                            }
                        }
                        tracing::debug!(
                            "Recorded {} ({} links, {} queued)",
                            record.url,
                            record.child_urls.len(),
                            queued
                        );
                    }

                    self.stats.record_page(record.depth);
                    self.store.push(record);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", e.url(), e);
                    self.stats.record_failure(&e);
                }
            }
        }
    }

    fn set_phase(&mut self, phase: CrawlPhase) {
        if self.phase != phase {
            tracing::debug!("Crawl phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }
}

/// Fetch + extract for one frontier entry
async fn fetch_page(
    entry: FrontierEntry,
    fetcher: &Fetcher,
    extractor: &Extractor,
    config: &CrawlConfig,
    visited: &HashSet<String>,
) -> std::result::Result<PageRecord, FetchError> {
    let document = fetcher.fetch(&entry.url).await?;
    Ok(build_record(entry, &document, extractor, config, visited))
}

/// Builds the page record; runs after the last await of a task
fn build_record(
    entry: FrontierEntry,
    document: &Document,
    extractor: &Extractor,
    config: &CrawlConfig,
    visited: &HashSet<String>,
) -> PageRecord {
    let title = extractor.extract_title(document);
    let content = if config.crawler.extract_content {
        extractor.extract_content(document)
    } else {
        String::new()
    };
    let child_urls = extractor.extract_links(document, &config.scope, visited);

    PageRecord {
        url: entry.url,
        title,
        content,
        depth: entry.depth,
        parent_url: entry.parent_url,
        child_urls,
    }
}

/// Crawls from `seed` with a fresh coordinator
///
/// # Example
///
/// ```no_run
/// use docs_mapper::{crawl, CrawlConfig};
///
/// # async fn run() -> docs_mapper::Result<()> {
/// let report = crawl(
///     CrawlConfig::default(),
///     "https://docs.oracle.com/en-us/iaas/Content/home.htm",
/// )
/// .await?;
/// println!("{} pages", report.store.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: CrawlConfig, seed: &str) -> Result<CrawlReport> {
    Coordinator::new(config)?.run(seed).await
}
