//! Output module for exporting crawl results
//!
//! This module handles:
//! - The structured markdown export grouped by depth
//! - The plain URL list export
//! - Crawl statistics and the printed summary

mod markdown;
pub mod stats;
mod urls;

pub use markdown::{format_markdown, write_markdown};
pub use stats::{format_statistics, print_statistics, CrawlStats};
pub use urls::{format_url_list, write_url_list};

use crate::config::CrawlConfig;
use crate::store::PageStore;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Files written by [`export`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub markdown: PathBuf,
    pub urls: PathBuf,
}

/// Writes the markdown and URL list exports
///
/// Both files go into `[output].directory`, which is created if missing.
///
/// # Returns
///
/// * `Ok(ExportPaths)` - The paths that were written
/// * `Err(OutputError)` - The directory or a file could not be written
pub fn export(store: &PageStore, config: &CrawlConfig) -> OutputResult<ExportPaths> {
    let directory = Path::new(&config.output.directory);
    std::fs::create_dir_all(directory).map_err(|e| {
        OutputError::Write(format!(
            "cannot create output directory {}: {}",
            directory.display(),
            e
        ))
    })?;

    let markdown = directory.join(&config.output.markdown_file);
    write_markdown(store, config.crawler.max_depth, &markdown)?;
    tracing::info!("Saved structured markdown to {}", markdown.display());

    let urls = directory.join(config.output.urls_file_name());
    write_url_list(store, &urls)?;
    tracing::info!("Saved {} URLs to {}", store.len(), urls.display());

    Ok(ExportPaths { markdown, urls })
}
