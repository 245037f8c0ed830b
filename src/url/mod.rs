//! URL handling module for Docs-Mapper
//!
//! This module provides URL normalization (the dedup key), host pattern
//! matching, and the in-scope check that defines the crawlable site boundary.
//! Everything here is pure: no I/O, no shared state.

mod matcher;
mod normalize;

use crate::config::ScopeConfig;
use ::url::Url;

// Re-export main functions
pub use matcher::host_matches;
pub use normalize::{normalize, normalize_url};

/// Decides whether a URL belongs to the crawlable site
///
/// A URL is in scope iff all of the following hold:
/// 1. Its scheme is HTTP or HTTPS
/// 2. Its host matches `allowed_host`
/// 3. Its path starts with one of `allowed_path_prefixes`
/// 4. It carries no fragment
/// 5. The extension of its last path segment is not blocked
///
/// Unparseable input is out of scope.
///
/// # Examples
///
/// ```
/// use docs_mapper::config::ScopeConfig;
/// use docs_mapper::url::is_in_scope;
///
/// let scope = ScopeConfig {
///     allowed_host: "docs.example.com".to_string(),
///     allowed_path_prefixes: vec!["/iaas/".to_string()],
///     blocked_extensions: vec!["pdf".to_string()],
/// };
///
/// assert!(is_in_scope("https://docs.example.com/iaas/Content/a.htm", &scope));
/// assert!(!is_in_scope("https://docs.example.com/iaas/guide.pdf", &scope));
/// assert!(!is_in_scope("https://docs.example.com/blog/a.htm", &scope));
/// ```
pub fn is_in_scope(url: &str, scope: &ScopeConfig) -> bool {
    match Url::parse(url) {
        Ok(parsed) => is_url_in_scope(&parsed, scope),
        Err(_) => false,
    }
}

/// Same as [`is_in_scope`] for an already-parsed URL
pub fn is_url_in_scope(url: &Url, scope: &ScopeConfig) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    let Some(host) = url.host_str() else {
        return false;
    };
    if !host_matches(&scope.allowed_host, host) {
        return false;
    }

    if matches!(url.fragment(), Some(fragment) if !fragment.is_empty()) {
        return false;
    }

    let path = url.path();
    if !scope
        .allowed_path_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()))
    {
        return false;
    }

    !has_blocked_extension(path, &scope.blocked_extensions)
}

/// Returns the lowercase extension of the last path segment, if any
fn path_extension(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn has_blocked_extension(path: &str, blocked: &[String]) -> bool {
    let Some(ext) = path_extension(path) else {
        return false;
    };
    blocked
        .iter()
        .any(|b| b.trim_start_matches('.').eq_ignore_ascii_case(&ext))
}
