//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the pipeline:
//! - Building one HTTP client per run with the configured user agent
//! - GET requests for chapter and series pages (text bodies)
//! - GET requests for images (byte bodies)
//! - Error classification
//!
//! Nothing here retries and nothing here returns `Err`: every failure is a
//! `FetchResult` variant, and the caller decides how to log it and whether
//! to continue.

use crate::config::CrawlerConfig;
use reqwest::{Client, Response};
use std::fmt;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult<T> {
    /// The server answered with a 2xx status and the body was read
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Response body
        body: T,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, truncated body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl<T> FetchResult<T> {
    /// Returns true if the fetch produced a body
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Splits the result into the body or a printable failure description
    pub fn into_body(self) -> Result<T, String> {
        match self {
            Self::Success { body, .. } => Ok(body),
            failure => Err(failure.to_string()),
        }
    }
}

impl<T> fmt::Display for FetchResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { status_code, .. } => write!(f, "HTTP {}", status_code),
            Self::HttpError { status_code } => write!(f, "HTTP {}", status_code),
            Self::NetworkError { error } => write!(f, "{}", error),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use scan_harvest::config::CrawlerConfig;
/// use scan_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page and returns its markup
///
/// # Outcome Mapping
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx, body decoded | Success |
/// | Any other HTTP status | HttpError |
/// | Timeout | NetworkError ("Request timeout") |
/// | Connection failure | NetworkError ("Connection refused") |
/// | Body read failure | NetworkError |
pub async fn fetch_page(client: &Client, url: &str) -> FetchResult<String> {
    let response = match send(client, url).await {
        Ok(response) => response,
        Err(failure) => return failure,
    };

    let final_url = response.url().to_string();
    let status_code = response.status().as_u16();

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code,
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

/// Fetches raw bytes, used for images
pub async fn fetch_bytes(client: &Client, url: &str) -> FetchResult<Vec<u8>> {
    let response = match send(client, url).await {
        Ok(response) => response,
        Err(failure) => return failure,
    };

    let final_url = response.url().to_string();
    let status_code = response.status().as_u16();

    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code,
            body: body.to_vec(),
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

/// Sends a GET request and rejects non-success statuses
async fn send<T>(client: &Client, url: &str) -> Result<Response, FetchResult<T>> {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            if status.is_success() {
                Ok(response)
            } else {
                Err(FetchResult::HttpError {
                    status_code: status.as_u16(),
                })
            }
        }
        Err(e) => Err(classify_error(&e)),
    }
}

fn classify_error<T>(e: &reqwest::Error) -> FetchResult<T> {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    };

    FetchResult::NetworkError { error }
}
