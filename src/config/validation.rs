use crate::config::types::{
    CrawlConfig, CrawlerConfig, HttpConfig, OutputConfig, ScopeConfig, SelectorConfig,
};
use crate::ConfigError;
use reqwest::header::HeaderValue;
use scraper::Selector;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_scope_config(&config.scope)?;
    validate_http_config(&config.http)?;
    validate_selector_config(&config.selectors)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_concurrency < 1 || config.max_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and 100, got {}",
            config.max_concurrency
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates the crawl boundary
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    validate_host_pattern(&config.allowed_host)?;

    if config.allowed_path_prefixes.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_path_prefixes must contain at least one prefix".to_string(),
        ));
    }

    for prefix in &config.allowed_path_prefixes {
        if !prefix.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "Path prefix '{}' must start with '/'",
                prefix
            )));
        }
    }

    for ext in &config.blocked_extensions {
        let bare = ext.trim_start_matches('.');
        if bare.is_empty() || bare.contains('/') {
            return Err(ConfigError::Validation(format!(
                "Invalid blocked extension '{}'",
                ext
            )));
        }
    }

    Ok(())
}

/// Validates a host pattern (supports a leading `*.` wildcard)
fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    let host = pattern.strip_prefix("*.").unwrap_or(pattern);

    if host.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_host cannot be empty".to_string(),
        ));
    }

    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "Host '{}' contains invalid characters",
            pattern
        )));
    }

    if host.starts_with('.')
        || host.ends_with('.')
        || host.starts_with('-')
        || host.ends_with('-')
        || host.contains("..")
    {
        return Err(ConfigError::Validation(format!(
            "Host '{}' is malformed",
            pattern
        )));
    }

    Ok(())
}

/// Request headers must be non-empty and representable as header values
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    let headers = [
        ("user-agent", &config.user_agent),
        ("accept", &config.accept),
        ("accept-language", &config.accept_language),
    ];

    for (name, value) in headers {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
        if HeaderValue::from_str(value).is_err() {
            return Err(ConfigError::Validation(format!(
                "{} is not a valid header value",
                name
            )));
        }
    }

    Ok(())
}

/// Every configured selector must parse
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    let lists = [
        ("title", &config.title),
        ("content", &config.content),
        ("navigation", &config.navigation),
        ("boilerplate", &config.boilerplate),
    ];

    for (name, list) in lists {
        if name != "boilerplate" && list.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{} selector list cannot be empty",
                name
            )));
        }
        for selector in list {
            Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
                selector: selector.clone(),
                message: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.markdown_file.is_empty() {
        return Err(ConfigError::Validation(
            "markdown_file cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&CrawlConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_host_pattern() {
        assert!(validate_host_pattern("docs.example.com").is_ok());
        assert!(validate_host_pattern("*.example.com").is_ok());
        assert!(validate_host_pattern("127.0.0.1").is_ok());
        assert!(validate_host_pattern("localhost").is_ok());

        assert!(validate_host_pattern("").is_err());
        assert!(validate_host_pattern("*.").is_err());
        assert!(validate_host_pattern(".example.com").is_err());
        assert!(validate_host_pattern("example.com.").is_err());
        assert!(validate_host_pattern("exa mple.com").is_err());
        assert!(validate_host_pattern("a..b").is_err());
    }

    #[test]
    fn test_path_prefix_must_be_absolute() {
        let mut config = CrawlConfig::default();
        config.scope.allowed_path_prefixes = vec!["iaas/".to_string()];
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));

        config.scope.allowed_path_prefixes.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_blocked_extension_rules() {
        let mut config = CrawlConfig::default();
        config.scope.blocked_extensions = vec![".pdf".to_string()];
        assert!(validate(&config).is_ok());

        config.scope.blocked_extensions = vec![".".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut config = CrawlConfig::default();
        config.selectors.title = vec!["h1[".to_string()];
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_http_headers_checked() {
        let mut config = CrawlConfig::default();
        config.http.user_agent = "  ".to_string();
        assert!(validate(&config).is_err());

        let mut config = CrawlConfig::default();
        config.http.accept = "text/html\r\nX-Injected: 1".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_timeout_must_be_positive() {
        let mut config = CrawlConfig::default();
        config.crawler.request_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }
}
