//! Append-only run log (`download_info.txt`)
//!
//! One log per invocation, written sequentially by whichever component is
//! active. The pipeline never reads it back. Failing to write a line is
//! reported through tracing and otherwise ignored, so a full disk never
//! stops a download.

use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the run log inside the series (or chapter) directory
pub const RUN_LOG_FILE: &str = "download_info.txt";

/// One line of the run log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    RunStarted { target: String, config_hash: String },
    ChapterStarted { title: String },
    PageFetchFailed { url: String, detail: String },
    ImageFailed { name: String, detail: String },
    CardSkipped { title: String, reason: String },
    PageLimitReached { url: String, limit: usize },
    PageRevisited { url: String },
    ImageRejected { file: String, detail: String },
    NoImages { dir: String },
    DocumentCreated { path: String },
    DocumentFailed { dir: String, detail: String },
    WorkspaceFailed { dir: String, detail: String },
}

impl fmt::Display for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunStarted {
                target,
                config_hash,
            } => write!(f, "Download started for {} (config {})", target, config_hash),
            Self::ChapterStarted { title } => write!(f, "Processing chapter: {}", title),
            Self::PageFetchFailed { url, detail } => {
                write!(f, "Error fetching page: {} ({})", url, detail)
            }
            Self::ImageFailed { name, detail } => {
                write!(f, "Error downloading {}: {}", name, detail)
            }
            Self::CardSkipped { title, reason } => {
                write!(f, "Skipped chapter card {}: {}", title, reason)
            }
            Self::PageLimitReached { url, limit } => {
                write!(f, "Page limit reached at {} ({} pages)", url, limit)
            }
            Self::PageRevisited { url } => write!(f, "Page already visited: {}", url),
            Self::ImageRejected { file, detail } => {
                write!(f, "Error processing image {}: {}", file, detail)
            }
            Self::NoImages { dir } => write!(f, "No valid images found in {}", dir),
            Self::DocumentCreated { path } => write!(f, "Document created: {}", path),
            Self::DocumentFailed { dir, detail } => {
                write!(f, "Error creating document in {}: {}", dir, detail)
            }
            Self::WorkspaceFailed { dir, detail } => {
                write!(f, "Error creating chapter folder {}: {}", dir, detail)
            }
        }
    }
}

/// Handle on the run log file
///
/// Cloning is cheap; every clone appends to the same file.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Creates (or truncates) the log in `dir` and writes the start line
    pub fn start(dir: &Path, target: &str, config_hash: &str) -> std::io::Result<Self> {
        let path = dir.join(RUN_LOG_FILE);
        std::fs::File::create(&path)?;

        let log = Self { path };
        log.record(RunEvent::RunStarted {
            target: target.to_string(),
            config_hash: config_hash.to_string(),
        });
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one timestamped line
    pub fn record(&self, event: RunEvent) {
        let line = format!(
            "{} {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            event
        );

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = result {
            tracing::warn!("Failed to append to {}: {}", self.path.display(), e);
        }
    }
}
