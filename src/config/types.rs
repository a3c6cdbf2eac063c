use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Scan-Harvest
///
/// Every section and key is optional; a missing key takes the value the
/// downloader was originally written against.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub download: DownloadConfig,
}

/// Where the content lives and how its pages are shaped
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Origin every relative link is resolved against
    pub origin: String,

    /// Path fragment that marks a URL as a single chapter page
    #[serde(rename = "single-chapter-marker")]
    pub single_chapter_marker: String,

    /// Image sources containing any of these substrings are not content
    #[serde(rename = "excluded-assets")]
    pub excluded_assets: Vec<String>,

    /// Repeated element holding one chapter on a series page
    #[serde(rename = "chapter-card-selector")]
    pub chapter_card_selector: String,

    /// Link inside a chapter card
    #[serde(rename = "chapter-link-selector")]
    pub chapter_link_selector: String,

    /// Title inside a chapter card
    #[serde(rename = "chapter-title-selector")]
    pub chapter_title_selector: String,

    /// Navigation control pointing at the next page of a chapter
    #[serde(rename = "next-page-selector")]
    pub next_page_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "https://mangaita.io".to_string(),
            single_chapter_marker: "/scan/".to_string(),
            excluded_assets: vec!["logo.2c1c1f72.webp".to_string()],
            chapter_card_selector: "div.col-chapter".to_string(),
            chapter_link_selector: "a[href]".to_string(),
            chapter_title_selector: "h5".to_string(),
            next_page_selector: "a.btn.btn-primary.btn-navigation.btn-next".to_string(),
        }
    }
}

/// HTTP behaviour configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Upper bound on pages followed inside one chapter
    #[serde(rename = "max-pages-per-chapter")]
    pub max_pages_per_chapter: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("scan-harvest/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_pages_per_chapter: 500,
        }
    }
}

/// Output behaviour configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Reverse the chapter listing before filtering
    #[serde(rename = "latest-first")]
    pub latest_first: bool,

    /// Assemble a PDF for each chapter
    #[serde(rename = "create-pdf")]
    pub create_pdf: bool,

    /// Put downloads under a dedicated `Manga` directory
    #[serde(rename = "create-manga-folder")]
    pub create_manga_folder: bool,

    /// Put chapter workspaces under a `Scan` directory
    #[serde(rename = "create-scan-folder")]
    pub create_scan_folder: bool,

    /// Overrides the root output directory
    #[serde(rename = "custom-save-path")]
    pub custom_save_path: Option<PathBuf>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            latest_first: false,
            create_pdf: false,
            create_manga_folder: true,
            create_scan_folder: true,
            custom_save_path: None,
        }
    }
}
