//! Configuration module for Scan-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file behaves like the
//! downloader's stock settings.
//!
//! # Example
//!
//! ```no_run
//! use scan_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config/config.toml")).unwrap();
//! println!("Pages per chapter are capped at {}", config.crawler.max_pages_per_chapter);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, DownloadConfig, SiteConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_or_default, parse_config,
    DEFAULT_CONFIG_HASH,
};
pub use validation::compile_selector;
