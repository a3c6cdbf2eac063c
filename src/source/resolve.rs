use url::Url;

/// Resolves a link or image reference found on a page to an absolute URL
///
/// # Resolution Rules
///
/// 1. Empty references resolve to nothing
/// 2. A reference that already parses as an absolute URL is kept as is
/// 3. Anything else is joined onto the site origin, not onto the page it
///    was found on
/// 4. Only HTTP and HTTPS results are accepted
///
/// # Examples
///
/// ```
/// use scan_harvest::source::resolve_reference;
/// use url::Url;
///
/// let origin = Url::parse("https://mangaita.io").unwrap();
/// let url = resolve_reference("/uploads/ch1/01.jpg", &origin).unwrap();
/// assert_eq!(url.as_str(), "https://mangaita.io/uploads/ch1/01.jpg");
/// ```
pub fn resolve_reference(reference: &str, origin: &Url) -> Option<Url> {
    let reference = reference.trim();

    if reference.is_empty() {
        return None;
    }

    let resolved = match Url::parse(reference) {
        Ok(absolute) => absolute,
        Err(url::ParseError::RelativeUrlWithoutBase) => origin.join(reference).ok()?,
        Err(_) => return None,
    };

    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// Derives a file name from the last path segment of a URL
///
/// The query string and fragment never take part, so
/// `https://cdn/x/01.jpg?v=3` becomes `01.jpg`. Returns None when the path
/// ends in a slash or has no segments.
pub fn file_name_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .last()
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}
