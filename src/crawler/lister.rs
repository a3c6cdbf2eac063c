//! Chapter listing of a series page

use crate::crawler::fetcher::fetch_page;
use crate::crawler::parser::{ChapterCard, LinkExtractor};
use crate::source::ChapterNumber;
use crate::HarvestError;
use reqwest::Client;
use url::Url;

/// One chapter of a series, as listed on the series page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDescriptor {
    /// First line of the card title, trimmed
    pub title: String,

    /// Chapter number taken from the title
    pub number: ChapterNumber,

    pub url: Url,

    /// 1-based position in processing order
    pub ordinal: usize,
}

/// A chapter card that could not become a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCard {
    pub title: String,
    pub reason: String,
}

/// Chapters of a series in processing order
#[derive(Debug, Clone, Default)]
pub struct ChapterListing {
    pub chapters: Vec<ChapterDescriptor>,

    /// Cards whose title carried no chapter number
    pub skipped: Vec<SkippedCard>,

    /// Cards missing a link or a title
    pub incomplete_cards: usize,
}

/// Reads chapter listings from series pages
pub struct ChapterLister<'a> {
    client: &'a Client,
    extractor: &'a LinkExtractor,
    latest_first: bool,
}

impl<'a> ChapterLister<'a> {
    pub fn new(client: &'a Client, extractor: &'a LinkExtractor, latest_first: bool) -> Self {
        Self {
            client,
            extractor,
            latest_first,
        }
    }

    /// Fetches the series page once and builds its chapter listing
    ///
    /// # Returns
    ///
    /// * `Ok(ChapterListing)` - The page was fetched; the listing may be empty
    /// * `Err(HarvestError::PageFetch)` - The series page could not be fetched
    pub async fn list(&self, series_url: &Url) -> Result<ChapterListing, HarvestError> {
        let markup = fetch_page(self.client, series_url.as_str())
            .await
            .into_body()
            .map_err(|detail| HarvestError::PageFetch {
                url: series_url.to_string(),
                detail,
            })?;

        let (cards, incomplete_cards) = self.extractor.chapter_cards(&markup);
        if incomplete_cards > 0 {
            tracing::debug!("Ignored {} incomplete chapter cards", incomplete_cards);
        }

        let mut listing = build_listing(cards, self.latest_first);
        listing.incomplete_cards = incomplete_cards;
        Ok(listing)
    }
}

/// Turns chapter cards into descriptors
///
/// The listing is reversed first when `latest_first` is set, so ordinals
/// follow processing order. A title without a number is skipped rather than
/// aborting the whole series.
pub fn build_listing(mut cards: Vec<ChapterCard>, latest_first: bool) -> ChapterListing {
    if latest_first {
        cards.reverse();
    }

    let mut listing = ChapterListing::default();

    for card in cards {
        let title = first_line(&card.title);

        match ChapterNumber::extract(&title) {
            Some(number) => {
                let ordinal = listing.chapters.len() + 1;
                listing.chapters.push(ChapterDescriptor {
                    title,
                    number,
                    url: card.url,
                    ordinal,
                });
            }
            None => {
                tracing::warn!("Chapter '{}' has no number in its title, skipping", title);
                listing.skipped.push(SkippedCard {
                    title,
                    reason: "no chapter number in title".to_string(),
                });
            }
        }
    }

    listing
}

fn first_line(text: &str) -> String {
    text.trim()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
