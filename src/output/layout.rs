//! On-disk layout of downloads
//!
//! ```text
//! <root>/<series>/download_info.txt
//! <root>/<series>/[Scan/]<chapter title>/<images…>, chapter.pdf
//! <root>/[Scan/]<chapter tail>/…            (single chapter runs)
//! ```
//!
//! `<root>` is the custom save path, else `<base>/Manga`, else `<base>` when
//! the manga folder is disabled.

use crate::config::DownloadConfig;
use std::path::{Path, PathBuf};

/// Name of the default root directory under the base directory
pub const MANGA_DIR: &str = "Manga";

/// Name of the intermediate directory holding chapter workspaces
pub const SCAN_DIR: &str = "Scan";

/// Resolves directories for one run
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    scan_folder: bool,
}

impl OutputLayout {
    /// Builds the layout from the download settings
    ///
    /// `base_dir` is where downloads land when no custom save path is set,
    /// normally the working directory.
    pub fn new(config: &DownloadConfig, base_dir: &Path) -> Self {
        let root = match &config.custom_save_path {
            Some(path) => path.clone(),
            None if config.create_manga_folder => base_dir.join(MANGA_DIR),
            None => base_dir.to_path_buf(),
        };

        Self {
            root,
            scan_folder: config.create_scan_folder,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a series; holds the run log
    pub fn series_dir(&self, series: &str) -> PathBuf {
        self.root.join(sanitize_component(series))
    }

    /// Workspace of one chapter of a series
    pub fn chapter_dir(&self, series: &str, chapter_title: &str) -> PathBuf {
        self.chapters_parent(self.series_dir(series))
            .join(sanitize_component(chapter_title))
    }

    /// Workspace of a chapter downloaded on its own, named after its URL tail
    pub fn single_chapter_dir(&self, tail: &str) -> PathBuf {
        self.chapters_parent(self.root.clone())
            .join(sanitize_component(tail))
    }

    fn chapters_parent(&self, dir: PathBuf) -> PathBuf {
        if self.scan_folder {
            dir.join(SCAN_DIR)
        } else {
            dir
        }
    }
}

/// Makes a title safe to use as a single path component
///
/// Path separators and characters reserved on common filesystems become
/// `_`; surrounding whitespace and trailing dots are dropped. An empty
/// result becomes `_`.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim_end_matches('.').trim();
    match cleaned {
        "" | "." | ".." => "_".to_string(),
        other => other.to_string(),
    }
}
