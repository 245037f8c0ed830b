/// Checks if a host matches the configured host pattern
///
/// Two pattern forms are supported:
/// 1. Exact: "docs.example.com" matches only "docs.example.com"
/// 2. Wildcard: "*.example.com" matches "example.com" and any subdomain of it
///
/// Comparison ignores ASCII case; hosts coming out of `url::Url` are already
/// lowercase but configured patterns may not be.
///
/// # Examples
///
/// ```
/// use docs_mapper::url::host_matches;
///
/// assert!(host_matches("docs.example.com", "docs.example.com"));
/// assert!(host_matches("*.example.com", "docs.example.com"));
/// assert!(!host_matches("docs.example.com", "blog.example.com"));
/// ```
pub fn host_matches(pattern: &str, host: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let host = host.to_ascii_lowercase();

    match pattern.strip_prefix("*.") {
        Some(base) => host == base || host.ends_with(&format!(".{}", base)),
        None => host == pattern,
    }
}
