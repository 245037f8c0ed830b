//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The frontier (visit queue + visited set)
//! - HTTP fetching under a concurrency limit
//! - Title, content, and link extraction
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;

pub use coordinator::{crawl, Coordinator, CrawlPhase, CrawlReport};
pub use extractor::{clean_text, Document, Extractor, SelectorChain, UNTITLED};
pub use fetcher::{build_http_client, Fetcher};
pub use frontier::{Frontier, FrontierEntry, VisitedSnapshot};
