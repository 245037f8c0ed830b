use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a URL string into its dedup key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not HTTP or HTTPS
/// 3. Reject URLs without a host
/// 4. Drop credentials, query string and fragment
///
/// Scheme, host (lowercased by the parser), explicit port and path are kept,
/// so two links differing only in tracking parameters or in-page anchors
/// collapse to the same key. Applying it twice yields the same string.
///
/// # Examples
///
/// ```
/// use docs_mapper::url::normalize;
///
/// let key = normalize("https://Docs.Example.com/iaas/a.htm?utm_source=x#intro").unwrap();
/// assert_eq!(key, "https://docs.example.com/iaas/a.htm");
/// ```
pub fn normalize(url_str: &str) -> UrlResult<String> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_url(url).map(String::from)
}

/// Normalizes an already-parsed URL, see [`normalize`]
pub fn normalize_url(mut url: Url) -> UrlResult<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    // Cannot fail for http(s) URLs that have a host
    let _ = url.set_username("");
    let _ = url.set_password(None);

    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}
