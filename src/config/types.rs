use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for a crawl
///
/// Every section has defaults, so an empty TOML file (or none at all) yields
/// a configuration aimed at the OCI documentation site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlConfig {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub scope: ScopeConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the seed URL (seed is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-concurrency")]
    pub max_concurrency: u32,

    /// Delay before each request (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Extract main content text in addition to titles
    #[serde(rename = "extract-content")]
    pub extract_content: bool,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_concurrency: 10,
            request_delay_ms: 100,
            request_timeout_secs: 30,
            extract_content: false,
        }
    }
}

/// Crawl boundary: which URLs count as part of the site
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Host pattern (e.g., "docs.example.com" or "*.example.com")
    #[serde(rename = "allowed-host")]
    pub allowed_host: String,

    /// Path prefixes a URL must start with, checked in order
    #[serde(rename = "allowed-path-prefixes")]
    pub allowed_path_prefixes: Vec<String>,

    /// File extensions that are never crawled (without the leading dot)
    #[serde(rename = "blocked-extensions")]
    pub blocked_extensions: Vec<String>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            allowed_host: "docs.oracle.com".to_string(),
            allowed_path_prefixes: vec!["/en-us/iaas/".to_string(), "/iaas/".to_string()],
            blocked_extensions: ["pdf", "zip", "tar", "gz"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Request header configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub accept: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
        }
    }
}

/// Ordered CSS selector lists used by the extractor
///
/// Within each list the first selector that yields a usable match wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub title: Vec<String>,
    pub content: Vec<String>,
    pub navigation: Vec<String>,
    pub boilerplate: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: owned(&["h1", ".page-title", ".title", "title"]),
            content: owned(&[
                "main",
                ".content",
                ".main-content",
                ".page-content",
                ".documentation-content",
                "article",
                ".article-content",
                "#content",
            ]),
            navigation: owned(&[
                "nav a[href]",
                ".toc a[href]",
                ".ohc-toc a[href]",
                "aside a[href]",
                ".sidebar a[href]",
                ".left-nav a[href]",
                "a[href*=\"/Content/\"]",
                "a[href*=\"/iaas/\"]",
            ]),
            boilerplate: owned(&[
                "nav",
                "header",
                "footer",
                ".navigation",
                ".breadcrumb",
                ".toc",
                ".sidebar",
                ".left-nav",
                ".right-nav",
                "script",
                "style",
                ".advertisement",
                ".ads",
                ".social-share",
            ]),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the export files are written into
    pub directory: String,

    /// File name of the structured markdown export
    #[serde(rename = "markdown-file")]
    pub markdown_file: String,

    /// File name of the plain URL list; derived from the markdown name if unset
    #[serde(rename = "urls-file")]
    pub urls_file: Option<String>,
}

impl OutputConfig {
    /// Returns the URL list file name, e.g. `docs_urls.md` -> `docs_urls_urls.txt`
    pub fn urls_file_name(&self) -> String {
        if let Some(name) = &self.urls_file {
            return name.clone();
        }
        let stem = self
            .markdown_file
            .strip_suffix(".md")
            .unwrap_or(&self.markdown_file);
        format!("{}_urls.txt", stem)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "scraped_docs".to_string(),
            markdown_file: "docs_urls.md".to_string(),
            urls_file: None,
        }
    }
}
