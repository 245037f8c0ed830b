//! Docs-Mapper: a breadth-first documentation site mapper
//!
//! This crate crawls a single documentation site from a seed page, following
//! its navigation hierarchy within host/path constraints up to a depth bound,
//! and collects a title, optional content text, and child links per page.

pub mod config;
pub mod crawler;
pub mod output;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for Docs-Mapper operations
#[derive(Debug, Error)]
pub enum DocsMapperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL {url}: {reason}")]
    InvalidSeedUrl { url: String, reason: String },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Per-page fetch failure
///
/// None of these stop a crawl: the page is logged and dropped, and the
/// coordinator moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection error for {url}: {message}")]
    Connection { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to parse response from {url}: {message}")]
    Parse { url: String, message: String },
}

impl FetchError {
    /// Short label used when tallying failures
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Connection { .. } => "connection",
            Self::HttpStatus { .. } => "http-status",
            Self::Parse { .. } => "parse",
        }
    }

    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::Connection { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::Parse { url, .. } => url,
        }
    }
}

/// Result type alias for Docs-Mapper operations
pub type Result<T> = std::result::Result<T, DocsMapperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{crawl, Coordinator, CrawlReport};
pub use store::{PageRecord, PageStore};
pub use crate::url::{is_in_scope, normalize};
