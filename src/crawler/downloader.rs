//! Image downloader
//!
//! Every image reference gets exactly one attempt per run. A failed attempt
//! is reported in the returned outcome and the caller moves on to the next
//! reference.

use crate::crawler::fetcher::{fetch_bytes, FetchResult};
use crate::source::{file_name_from_url, resolve_reference};
use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

/// Record of one image download attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// File name derived from the image URL (or the raw reference when none could be derived)
    pub name: String,

    /// Where the image was, or would have been, written
    pub path: PathBuf,

    /// Resolved image URL, if the reference could be resolved
    pub url: Option<String>,

    /// Whether the image is on disk
    pub success: bool,

    /// Failure description for unsuccessful attempts
    pub error_detail: Option<String>,
}

impl DownloadOutcome {
    fn failed(name: String, path: PathBuf, url: Option<String>, detail: String) -> Self {
        Self {
            name,
            path,
            url,
            success: false,
            error_detail: Some(detail),
        }
    }
}

/// Downloads images into chapter workspaces
pub struct ImageDownloader<'a> {
    client: &'a Client,
    origin: &'a Url,
}

impl<'a> ImageDownloader<'a> {
    pub fn new(client: &'a Client, origin: &'a Url) -> Self {
        Self { client, origin }
    }

    /// Downloads one image reference into `dest_dir`
    ///
    /// # Steps
    ///
    /// 1. Resolve the reference against the site origin
    /// 2. Name the file after the last URL path segment (query stripped)
    /// 3. GET the bytes
    /// 4. Write `dest_dir/<name>`, replacing any file of the same name
    pub async fn download(&self, reference: &str, dest_dir: &Path) -> DownloadOutcome {
        let url = match resolve_reference(reference, self.origin) {
            Some(url) => url,
            None => {
                return DownloadOutcome::failed(
                    reference.to_string(),
                    dest_dir.to_path_buf(),
                    None,
                    format!("cannot resolve image reference '{}'", reference),
                );
            }
        };

        let name = match file_name_from_url(&url) {
            Some(name) => name,
            None => {
                return DownloadOutcome::failed(
                    reference.to_string(),
                    dest_dir.to_path_buf(),
                    Some(url.to_string()),
                    format!("no file name in {}", url),
                );
            }
        };
        let path = dest_dir.join(&name);

        tracing::debug!("Downloading {} from {}", name, url);

        let bytes = match fetch_bytes(self.client, url.as_str()).await {
            FetchResult::Success { body, .. } => body,
            failure => {
                return DownloadOutcome::failed(
                    name,
                    path,
                    Some(url.to_string()),
                    format!("{} ({})", url, failure),
                );
            }
        };

        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            return DownloadOutcome::failed(name, path, Some(url.to_string()), e.to_string());
        }

        tracing::debug!("Downloaded {} to {}", name, path.display());

        DownloadOutcome {
            name,
            path,
            url: Some(url.to_string()),
            success: true,
            error_detail: None,
        }
    }
}
