use crate::config::SiteConfig;
use crate::SourceError;
use url::Url;

/// What an input URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// A series landing page listing its chapters
    Series,
    /// One chapter ("scan") page
    SingleChapter,
}

/// The validated input of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesReference {
    url: Url,
    kind: ReferenceKind,
    name: String,
}

impl SeriesReference {
    /// Parses and validates an input URL against the configured site
    ///
    /// Inputs without a scheme (`mangaita.io/manga/x`) are read as HTTPS.
    /// The URL must point at the configured origin's host and port, and must
    /// carry at least one path segment to name the download after.
    ///
    /// # Examples
    ///
    /// ```
    /// use scan_harvest::config::SiteConfig;
    /// use scan_harvest::source::{ReferenceKind, SeriesReference};
    ///
    /// let site = SiteConfig::default();
    /// let series = SeriesReference::parse("https://mangaita.io/manga/one-piece", &site).unwrap();
    /// assert_eq!(series.kind(), ReferenceKind::Series);
    /// assert_eq!(series.name(), "one-piece");
    ///
    /// let chapter = SeriesReference::parse("mangaita.io/scan/48213", &site).unwrap();
    /// assert_eq!(chapter.kind(), ReferenceKind::SingleChapter);
    /// ```
    pub fn parse(input: &str, site: &SiteConfig) -> Result<Self, SourceError> {
        let input = input.trim();
        let with_scheme = if input.contains("://") {
            input.to_string()
        } else {
            format!("https://{}", input)
        };

        let url = Url::parse(&with_scheme).map_err(|e| SourceError::Parse(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SourceError::InvalidScheme(url.scheme().to_string()));
        }

        let origin = Url::parse(&site.origin).map_err(|e| SourceError::Parse(e.to_string()))?;
        if !same_site(&url, &origin) {
            return Err(SourceError::ForeignSite {
                url: url.to_string(),
                expected: site.origin.clone(),
            });
        }

        let name = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(|s| s.to_string())
            .ok_or_else(|| SourceError::MissingName(url.to_string()))?;

        let kind = if url.path().contains(site.single_chapter_marker.as_str()) {
            ReferenceKind::SingleChapter
        } else {
            ReferenceKind::Series
        };

        Ok(Self { url, kind, name })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Last non-empty path segment: the series name, or the chapter tail
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Host comparison is case-insensitive; a leading `www.` is ignored
fn same_site(url: &Url, origin: &Url) -> bool {
    fn bare_host(u: &Url) -> Option<String> {
        let host = u.host_str()?.to_lowercase();
        Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
    }

    match (bare_host(url), bare_host(origin)) {
        (Some(a), Some(b)) => {
            a == b && url.port_or_known_default() == origin.port_or_known_default()
        }
        _ => false,
    }
}
