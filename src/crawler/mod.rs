//! Crawler module for the download pipeline
//!
//! This module contains the core pipeline logic, including:
//! - HTTP fetching of pages and images
//! - HTML parsing of chapter pages and series listings
//! - Page-by-page chapter crawling and image downloads
//! - Chapter range selection
//! - Overall run coordination

mod chapter;
mod coordinator;
mod downloader;
mod fetcher;
mod lister;
mod parser;
mod range;

pub use chapter::{ChapterCrawl, ChapterCrawler, CrawlStop, PageWalk};
pub use coordinator::{run_download, Coordinator};
pub use downloader::{DownloadOutcome, ImageDownloader};
pub use fetcher::{build_http_client, fetch_bytes, fetch_page, FetchResult};
pub use lister::{build_listing, ChapterDescriptor, ChapterLister, ChapterListing, SkippedCard};
pub use parser::{ChapterCard, LinkExtractor, PageResult};
pub use range::{select, ChapterRange};
