use crate::config::types::{Config, CrawlerConfig, SiteConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    Ok(())
}

/// Validates the site description
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_origin(&config.origin)?;

    if config.single_chapter_marker.trim().is_empty() {
        return Err(ConfigError::Validation(
            "single-chapter-marker cannot be empty".to_string(),
        ));
    }

    if let Some(index) = config
        .excluded_assets
        .iter()
        .position(|asset| asset.trim().is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "excluded-assets entry {} is empty and would exclude every image",
            index
        )));
    }

    for selector in [
        &config.chapter_card_selector,
        &config.chapter_link_selector,
        &config.chapter_title_selector,
        &config.next_page_selector,
    ] {
        compile_selector(selector)?;
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.max_pages_per_chapter < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages-per-chapter must be >= 1, got {}",
            config.max_pages_per_chapter
        )));
    }

    Ok(())
}

/// The origin must be an absolute HTTP(S) URL with a host
fn validate_origin(origin: &str) -> Result<(), ConfigError> {
    let url = Url::parse(origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", origin, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Origin '{}' must use HTTP or HTTPS",
            origin
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Origin '{}' has no host",
            origin
        )));
    }

    Ok(())
}

/// Compiles a CSS selector, mapping failures to a configuration error
pub fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
