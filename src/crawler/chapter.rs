//! Chapter crawler
//!
//! A chapter is a chain of pages linked by a "next" control. The chain is
//! walked with an explicit loop, strictly in order, with a page bound and
//! revisit detection so a circular chain still terminates. All pages of a
//! chapter download into the same workspace.

use crate::crawler::downloader::{DownloadOutcome, ImageDownloader};
use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::crawler::parser::{LinkExtractor, PageResult};
use crate::output::{RunEvent, RunLog};
use reqwest::Client;
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Why a chapter walk ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlStop {
    /// The last page had no "next" link
    Exhausted,
    /// A page could not be fetched
    FetchFailed { url: String, detail: String },
    /// The page bound was reached before the chain ended
    PageLimit { url: String },
    /// The next link pointed back at a page already visited
    Revisit { url: String },
}

/// Result of crawling one chapter
#[derive(Debug, Clone)]
pub struct ChapterCrawl {
    /// One outcome per image reference, in download order
    pub outcomes: Vec<DownloadOutcome>,

    /// Pages fetched and parsed successfully
    pub pages_visited: usize,

    pub stop: CrawlStop,
}

impl ChapterCrawl {
    pub fn downloaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }
}

/// Lazy, bounded sequence of the pages of one chapter
pub struct PageWalk<'a> {
    client: &'a Client,
    extractor: &'a LinkExtractor,
    next: Option<Url>,
    visited: HashSet<String>,
    pages: usize,
    max_pages: usize,
    stop: Option<CrawlStop>,
}

impl<'a> PageWalk<'a> {
    pub fn new(
        client: &'a Client,
        extractor: &'a LinkExtractor,
        start_url: Url,
        max_pages: usize,
    ) -> Self {
        Self {
            client,
            extractor,
            next: Some(start_url),
            visited: HashSet::new(),
            pages: 0,
            max_pages,
            stop: None,
        }
    }

    /// Fetches and parses the next page of the chain
    ///
    /// Returns None once the chain has ended; `finish` then tells why.
    pub async fn next_page(&mut self) -> Option<(Url, PageResult)> {
        let url = self.next.take()?;

        if self.pages >= self.max_pages {
            self.stop = Some(CrawlStop::PageLimit {
                url: url.to_string(),
            });
            return None;
        }

        if !self.visited.insert(url.to_string()) {
            self.stop = Some(CrawlStop::Revisit {
                url: url.to_string(),
            });
            return None;
        }

        match fetch_page(self.client, url.as_str()).await {
            FetchResult::Success { body, .. } => {
                self.pages += 1;
                let page = self.extractor.extract(&body);
                self.next = page.next_page_url.clone();
                Some((url, page))
            }
            failure => {
                self.stop = Some(CrawlStop::FetchFailed {
                    url: url.to_string(),
                    detail: failure.to_string(),
                });
                None
            }
        }
    }

    /// Pages visited and the reason the walk ended
    pub fn finish(self) -> (usize, CrawlStop) {
        (self.pages, self.stop.unwrap_or(CrawlStop::Exhausted))
    }
}

/// Crawls chapters page by page into a workspace
pub struct ChapterCrawler<'a> {
    client: &'a Client,
    extractor: &'a LinkExtractor,
    max_pages: usize,
}

impl<'a> ChapterCrawler<'a> {
    pub fn new(client: &'a Client, extractor: &'a LinkExtractor, max_pages: usize) -> Self {
        Self {
            client,
            extractor,
            max_pages,
        }
    }

    /// Walks the chapter starting at `start_url` and downloads every image
    ///
    /// A fetch failure ends the walk (a failing root page yields zero
    /// images) and is written to the run log, as is every failed image.
    pub async fn crawl(&self, start_url: &Url, dest_dir: &Path, run_log: &RunLog) -> ChapterCrawl {
        let downloader = ImageDownloader::new(self.client, self.extractor.origin());
        let mut walk = PageWalk::new(self.client, self.extractor, start_url.clone(), self.max_pages);
        let mut outcomes = Vec::new();

        while let Some((url, page)) = walk.next_page().await {
            tracing::debug!(
                "Page {} has {} images, next: {}",
                url,
                page.image_refs.len(),
                page.next_page_url
                    .as_ref()
                    .map(Url::as_str)
                    .unwrap_or("none")
            );

            for reference in &page.image_refs {
                let outcome = downloader.download(reference, dest_dir).await;
                if let Some(detail) = &outcome.error_detail {
                    tracing::warn!("Error downloading {}: {}", outcome.name, detail);
                    run_log.record(RunEvent::ImageFailed {
                        name: outcome.name.clone(),
                        detail: detail.clone(),
                    });
                }
                outcomes.push(outcome);
            }
        }

        let (pages_visited, stop) = walk.finish();
        match &stop {
            CrawlStop::Exhausted => {}
            CrawlStop::FetchFailed { url, detail } => {
                tracing::warn!("Error fetching page {}: {}", url, detail);
                run_log.record(RunEvent::PageFetchFailed {
                    url: url.clone(),
                    detail: detail.clone(),
                });
            }
            CrawlStop::PageLimit { url } => {
                tracing::warn!("Stopping at {} after {} pages", url, self.max_pages);
                run_log.record(RunEvent::PageLimitReached {
                    url: url.clone(),
                    limit: self.max_pages,
                });
            }
            CrawlStop::Revisit { url } => {
                tracing::warn!("Next page {} was already visited, stopping", url);
                run_log.record(RunEvent::PageRevisited { url: url.clone() });
            }
        }

        ChapterCrawl {
            outcomes,
            pages_visited,
            stop,
        }
    }
}
