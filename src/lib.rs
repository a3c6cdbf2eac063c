//! Scan-Harvest: a sequential chapter downloader
//!
//! This crate walks a series landing page, selects chapters by number, follows
//! each chapter's "next page" chain, downloads every image it finds and folds
//! the images of a chapter into one PDF document.

pub mod config;
pub mod crawler;
pub mod output;
pub mod source;

use thiserror::Error;

/// Main error type for Scan-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Invalid chapter range: end {end} is lower than start {start}")]
    InvalidRange { start: String, end: String },

    #[error("Failed to fetch page {url}: {detail}")]
    PageFetch { url: String, detail: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Errors raised while interpreting an input URL
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("URL {url} does not belong to {expected}")]
    ForeignSite { url: String, expected: String },

    #[error("URL {0} has no path segment to name the download after")]
    MissingName(String),
}

/// Errors raised while building a chapter document
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to encode PDF content: {0}")]
    Encode(String),

    #[error("Failed to write document: {0}")]
    Write(String),

    #[error("Assembly task failed: {0}")]
    Join(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Scan-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for input URL operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{ChapterRange, Coordinator};
pub use source::{ChapterNumber, ReferenceKind, SeriesReference};
