//! Download coordinator - main pipeline orchestration
//!
//! This module ties the pipeline together:
//! - Preparing the output layout and the run log
//! - Listing and selecting chapters of a series
//! - Crawling each selected chapter into its workspace
//! - Assembling each chapter into a document
//!
//! Chapters are processed one after the other. A failing chapter is logged
//! and the next one starts regardless.

use crate::config::{Config, DEFAULT_CONFIG_HASH};
use crate::crawler::chapter::ChapterCrawler;
use crate::crawler::lister::{ChapterLister, ChapterListing};
use crate::crawler::parser::LinkExtractor;
use crate::crawler::range::{select, ChapterRange};
use crate::crawler::{build_http_client, ChapterDescriptor};
use crate::output::{
    AssemblyReport, ChapterReport, DocumentAssembler, OutputLayout, RunEvent, RunLog, RunSummary,
};
use crate::source::{ReferenceKind, SeriesReference};
use crate::{AssemblyError, HarvestError};
use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

/// Main pipeline coordinator
pub struct Coordinator {
    config: Config,
    config_hash: String,
    client: Client,
    extractor: LinkExtractor,
    layout: OutputLayout,
    assembler: DocumentAssembler,
}

impl Coordinator {
    /// Creates a coordinator writing relative to the working directory
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - HTTP client and selectors are ready
    /// * `Err(HarvestError)` - The configuration cannot be used
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let base_dir = std::env::current_dir()?;
        Self::with_base_dir(config, &base_dir)
    }

    /// Creates a coordinator writing relative to `base_dir`
    pub fn with_base_dir(config: Config, base_dir: &Path) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.crawler)?;
        let extractor = LinkExtractor::new(&config.site)?;
        let layout = OutputLayout::new(&config.download, base_dir);
        let assembler = DocumentAssembler::new(config.download.create_pdf);

        Ok(Self {
            config,
            config_hash: DEFAULT_CONFIG_HASH.to_string(),
            client,
            extractor,
            layout,
            assembler,
        })
    }

    /// Sets the configuration hash written to run log headers
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Fetches the chapter listing of a series without downloading anything
    pub async fn list_chapters(
        &self,
        reference: &SeriesReference,
    ) -> Result<ChapterListing, HarvestError> {
        self.lister().list(reference.url()).await
    }

    /// Runs the pipeline for one input URL
    ///
    /// A single chapter URL is crawled and assembled directly, ignoring
    /// `range`. A series URL is listed, filtered by `range`, and every
    /// selected chapter is processed in listing order.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run finished; individual chapters may have failed
    /// * `Err(HarvestError)` - Output directories or the run log could not be created
    pub async fn run(
        &self,
        reference: &SeriesReference,
        range: &ChapterRange,
    ) -> Result<RunSummary, HarvestError> {
        match reference.kind() {
            ReferenceKind::SingleChapter => self.run_single_chapter(reference).await,
            ReferenceKind::Series => self.run_series(reference, range).await,
        }
    }

    /// Runs every reference in order, each as an independent run
    ///
    /// A reference whose run fails is logged and the next one still runs.
    /// Results come back in input order.
    pub async fn run_all(
        &self,
        references: &[SeriesReference],
        range: &ChapterRange,
    ) -> Vec<Result<RunSummary, HarvestError>> {
        let mut results = Vec::with_capacity(references.len());

        for reference in references {
            let result = self.run(reference, range).await;
            if let Err(e) = &result {
                tracing::error!("Download of {} failed: {}", reference.url(), e);
            }
            results.push(result);
        }

        results
    }

    async fn run_single_chapter(
        &self,
        reference: &SeriesReference,
    ) -> Result<RunSummary, HarvestError> {
        let dir = self.layout.single_chapter_dir(reference.name());
        std::fs::create_dir_all(&dir)?;
        let run_log = RunLog::start(&dir, reference.name(), &self.config_hash)?;

        tracing::info!("Downloading single chapter {}", reference.url());

        let mut summary = RunSummary::new(reference.name());
        let report = self
            .process_chapter(reference.name(), reference.url(), dir, &run_log)
            .await;
        summary.chapters.push(report);

        tracing::info!("Download finished");
        Ok(summary)
    }

    async fn run_series(
        &self,
        reference: &SeriesReference,
        range: &ChapterRange,
    ) -> Result<RunSummary, HarvestError> {
        let series = reference.name();
        let series_dir = self.layout.series_dir(series);
        std::fs::create_dir_all(&series_dir)?;
        let run_log = RunLog::start(&series_dir, series, &self.config_hash)?;

        let mut summary = RunSummary::new(series);

        let listing = match self.lister().list(reference.url()).await {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!("Failed to retrieve the chapter listing: {}", e);
                if let HarvestError::PageFetch { url, detail } = &e {
                    run_log.record(RunEvent::PageFetchFailed {
                        url: url.clone(),
                        detail: detail.clone(),
                    });
                }
                summary.listing_error = Some(e.to_string());
                return Ok(summary);
            }
        };

        for card in &listing.skipped {
            run_log.record(RunEvent::CardSkipped {
                title: card.title.clone(),
                reason: card.reason.clone(),
            });
        }
        summary.skipped = listing.skipped.clone();
        summary.incomplete_cards = listing.incomplete_cards;

        let selected = select(&listing.chapters, range);
        tracing::info!(
            "Selected {} of {} chapters of {}",
            selected.len(),
            listing.chapters.len(),
            series
        );

        for chapter in &selected {
            if let Some(report) = self.process_listed_chapter(series, chapter, &run_log).await {
                summary.chapters.push(report);
            }
        }

        tracing::info!("Download finished");
        Ok(summary)
    }

    async fn process_listed_chapter(
        &self,
        series: &str,
        chapter: &ChapterDescriptor,
        run_log: &RunLog,
    ) -> Option<ChapterReport> {
        let dir = self.layout.chapter_dir(series, &chapter.title);

        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::error!("Cannot create {}: {}", dir.display(), e);
            run_log.record(RunEvent::WorkspaceFailed {
                dir: dir.display().to_string(),
                detail: e.to_string(),
            });
            return None;
        }

        Some(
            self.process_chapter(&chapter.title, &chapter.url, dir, run_log)
                .await,
        )
    }

    /// Crawls one chapter into `dir` and assembles it
    async fn process_chapter(
        &self,
        title: &str,
        url: &Url,
        dir: PathBuf,
        run_log: &RunLog,
    ) -> ChapterReport {
        tracing::info!("Processing chapter: {}", title);
        run_log.record(RunEvent::ChapterStarted {
            title: title.to_string(),
        });

        let crawler = ChapterCrawler::new(
            &self.client,
            &self.extractor,
            self.config.crawler.max_pages_per_chapter,
        );
        let crawl = crawler.crawl(url, &dir, run_log).await;

        tracing::info!(
            "Chapter {}: {} images from {} pages ({} failed)",
            title,
            crawl.downloaded(),
            crawl.pages_visited,
            crawl.failed()
        );

        let mut report = ChapterReport::new(title.to_string(), dir, &crawl);
        report.assembly = self.assemble(&report.dir, run_log).await;
        report
    }

    async fn assemble(&self, dir: &Path, run_log: &RunLog) -> Option<AssemblyReport> {
        if !self.assembler.is_enabled() {
            tracing::info!("PDF creation is disabled in the config file");
            return None;
        }

        let assembler = self.assembler;
        let task_dir = dir.to_path_buf();
        let task_log = run_log.clone();

        let task = tokio::task::spawn_blocking(move || assembler.assemble(&task_dir, &task_log));

        match task.await {
            Ok(report) => Some(report),
            Err(e) => {
                let detail = AssemblyError::Join(e.to_string()).to_string();
                tracing::error!("Error creating document in {}: {}", dir.display(), detail);
                run_log.record(RunEvent::DocumentFailed {
                    dir: dir.display().to_string(),
                    detail,
                });
                None
            }
        }
    }

    fn lister(&self) -> ChapterLister<'_> {
        ChapterLister::new(
            &self.client,
            &self.extractor,
            self.config.download.latest_first,
        )
    }
}

/// Runs one download with a fresh coordinator
///
/// # Example
///
/// ```no_run
/// use scan_harvest::config::Config;
/// use scan_harvest::crawler::{run_download, ChapterRange};
/// use scan_harvest::source::SeriesReference;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let reference = SeriesReference::parse("https://mangaita.io/manga/berserk", &config.site)?;
/// let summary = run_download(config, &reference, &ChapterRange::default()).await?;
/// println!("{} images downloaded", summary.total_downloaded());
/// # Ok(())
/// # }
/// ```
pub async fn run_download(
    config: Config,
    reference: &SeriesReference,
    range: &ChapterRange,
) -> Result<RunSummary, HarvestError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run(reference, range).await
}
