//! Configuration module for Docs-Mapper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so the crawler also runs without a file.
//!
//! # Example
//!
//! ```no_run
//! use docs_mapper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("docs-mapper.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, CrawlerConfig, HttpConfig, OutputConfig, ScopeConfig, SelectorConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
