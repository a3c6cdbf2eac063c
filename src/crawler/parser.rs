//! HTML parser for chapter and series pages
//!
//! This module handles parsing HTML content to extract:
//! - Image references of a chapter page, in document order
//! - The optional "next page" navigation link
//! - Chapter cards (title and link) on a series page

use crate::config::{compile_selector, SiteConfig};
use crate::source::resolve_reference;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracted information from one chapter page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    /// Image `src` values as written in the page, in document order
    pub image_refs: Vec<String>,

    /// Absolute URL of the next page of the chapter, if any
    pub next_page_url: Option<Url>,
}

/// One chapter entry found on a series page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterCard {
    /// Raw title text of the card
    pub title: String,

    /// Absolute chapter URL
    pub url: Url,
}

/// Parses pages of the configured site
///
/// Selectors are compiled once when the extractor is built.
#[derive(Debug)]
pub struct LinkExtractor {
    origin: Url,
    excluded_assets: Vec<String>,
    image: Selector,
    next_page: Selector,
    card: Selector,
    card_link: Selector,
    card_title: Selector,
}

impl LinkExtractor {
    /// Builds an extractor from the site description
    ///
    /// # Returns
    ///
    /// * `Ok(LinkExtractor)` - All selectors compiled
    /// * `Err(ConfigError)` - The origin or a selector is invalid
    pub fn new(site: &SiteConfig) -> Result<Self, ConfigError> {
        let origin = Url::parse(&site.origin)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", site.origin, e)))?;

        Ok(Self {
            origin,
            excluded_assets: site.excluded_assets.clone(),
            image: compile_selector("img[src]")?,
            next_page: compile_selector(&site.next_page_selector)?,
            card: compile_selector(&site.chapter_card_selector)?,
            card_link: compile_selector(&site.chapter_link_selector)?,
            card_title: compile_selector(&site.chapter_title_selector)?,
        })
    }

    /// The origin relative references are resolved against
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Extracts image references and the next page link from a chapter page
    ///
    /// # Extraction Rules
    ///
    /// **Include:**
    /// - every `<img src="...">` with a non-empty source, in document order
    ///
    /// **Exclude:**
    /// - sources containing one of the configured excluded asset names (site logo)
    ///
    /// The next page is the first element matching the next-page selector
    /// with a non-empty `href`.
    ///
    /// # Example
    ///
    /// ```
    /// use scan_harvest::config::SiteConfig;
    /// use scan_harvest::crawler::LinkExtractor;
    ///
    /// let extractor = LinkExtractor::new(&SiteConfig::default()).unwrap();
    /// let html = r#"<img src="/logo.2c1c1f72.webp"><img src="/c/01.jpg">"#;
    /// let page = extractor.extract(html);
    /// assert_eq!(page.image_refs, vec!["/c/01.jpg".to_string()]);
    /// assert!(page.next_page_url.is_none());
    /// ```
    pub fn extract(&self, markup: &str) -> PageResult {
        let document = Html::parse_document(markup);

        let image_refs = document
            .select(&self.image)
            .filter_map(|element| element.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty() && !self.is_excluded(src))
            .map(str::to_string)
            .collect();

        let next_page_url = document
            .select(&self.next_page)
            .filter_map(|element| element.value().attr("href"))
            .find(|href| !href.trim().is_empty())
            .and_then(|href| resolve_reference(href, &self.origin));

        PageResult {
            image_refs,
            next_page_url,
        }
    }

    /// Extracts the chapter cards of a series page
    ///
    /// Returns the cards in document order plus the number of cards that
    /// were skipped because they lacked a link or a title.
    pub fn chapter_cards(&self, markup: &str) -> (Vec<ChapterCard>, usize) {
        let document = Html::parse_document(markup);
        let mut cards = Vec::new();
        let mut skipped = 0;

        for card in document.select(&self.card) {
            match self.parse_card(card) {
                Some(parsed) => cards.push(parsed),
                None => skipped += 1,
            }
        }

        (cards, skipped)
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Option<ChapterCard> {
        let href = card
            .select(&self.card_link)
            .find_map(|link| link.value().attr("href"))?;
        let title = card
            .select(&self.card_title)
            .next()
            .map(|title| title.text().collect::<String>())?;

        let url = resolve_reference(href, &self.origin)?;
        Some(ChapterCard { title, url })
    }

    fn is_excluded(&self, src: &str) -> bool {
        self.excluded_assets
            .iter()
            .any(|asset| src.contains(asset.as_str()))
    }
}
