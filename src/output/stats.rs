//! Run statistics
//!
//! The coordinator returns a `RunSummary` describing every chapter it
//! touched; the CLI prints it once a run ends.

use crate::crawler::{ChapterCrawl, CrawlStop, SkippedCard};
use crate::output::document::AssemblyReport;
use std::path::PathBuf;

/// What happened to one chapter
#[derive(Debug, Clone)]
pub struct ChapterReport {
    pub title: String,

    /// Chapter workspace
    pub dir: PathBuf,

    pub pages_visited: usize,
    pub downloaded: usize,
    pub failed: usize,
    pub stop: CrawlStop,

    /// Assembly result; None when assembly did not run
    pub assembly: Option<AssemblyReport>,
}

impl ChapterReport {
    pub fn new(title: String, dir: PathBuf, crawl: &ChapterCrawl) -> Self {
        Self {
            title,
            dir,
            pages_visited: crawl.pages_visited,
            downloaded: crawl.downloaded(),
            failed: crawl.failed(),
            stop: crawl.stop.clone(),
            assembly: None,
        }
    }

    pub fn document(&self) -> Option<&PathBuf> {
        self.assembly.as_ref().and_then(|a| a.document.as_ref())
    }
}

/// Summary of one run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Series name or chapter tail the run was started for
    pub target: String,

    /// Chapters in processing order
    pub chapters: Vec<ChapterReport>,

    /// Listing cards skipped for lack of a chapter number
    pub skipped: Vec<SkippedCard>,

    /// Listing cards ignored for lack of a link or a title
    pub incomplete_cards: usize,

    /// Set when the series page itself could not be fetched
    pub listing_error: Option<String>,
}

impl RunSummary {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            ..Default::default()
        }
    }

    pub fn total_downloaded(&self) -> usize {
        self.chapters.iter().map(|c| c.downloaded).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.chapters.iter().map(|c| c.failed).sum()
    }

    pub fn documents(&self) -> usize {
        self.chapters.iter().filter(|c| c.document().is_some()).count()
    }
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== {} ===", summary.target);

    if let Some(error) = &summary.listing_error {
        println!("  Failed to retrieve the chapter listing: {}", error);
    }

    for chapter in &summary.chapters {
        let stop = match &chapter.stop {
            CrawlStop::Exhausted => String::new(),
            CrawlStop::FetchFailed { url, .. } => format!(" (fetch failed at {})", url),
            CrawlStop::PageLimit { url } => format!(" (page limit at {})", url),
            CrawlStop::Revisit { url } => format!(" (loop at {})", url),
        };

        println!(
            "  {}: {} pages, {} images, {} failed{}",
            chapter.title, chapter.pages_visited, chapter.downloaded, chapter.failed, stop
        );

        if let Some(document) = chapter.document() {
            println!("    -> {}", document.display());
        }
    }

    for card in &summary.skipped {
        println!("  skipped '{}': {}", card.title, card.reason);
    }

    if summary.incomplete_cards > 0 {
        println!(
            "  ignored {} chapter cards without a link or title",
            summary.incomplete_cards
        );
    }

    println!(
        "  Total: {} chapters, {} images, {} failed, {} documents",
        summary.chapters.len(),
        summary.total_downloaded(),
        summary.total_failed(),
        summary.documents()
    );
}
