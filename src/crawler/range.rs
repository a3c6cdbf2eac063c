//! Chapter range selection

use crate::crawler::lister::ChapterDescriptor;
use crate::source::ChapterNumber;
use crate::HarvestError;

/// Inclusive chapter number bounds; `end = None` is unbounded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRange {
    start: ChapterNumber,
    end: Option<ChapterNumber>,
}

impl Default for ChapterRange {
    /// Chapter 1 onwards
    fn default() -> Self {
        Self {
            start: ChapterNumber::whole(1),
            end: None,
        }
    }
}

impl ChapterRange {
    /// Builds a range, rejecting `end < start`
    pub fn new(start: ChapterNumber, end: Option<ChapterNumber>) -> Result<Self, HarvestError> {
        if let Some(end) = &end {
            if *end < start {
                return Err(HarvestError::InvalidRange {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> &ChapterNumber {
        &self.start
    }

    pub fn end(&self) -> Option<&ChapterNumber> {
        self.end.as_ref()
    }

    pub fn contains(&self, number: &ChapterNumber) -> bool {
        *number >= self.start && !self.exceeds_end(number)
    }

    fn exceeds_end(&self, number: &ChapterNumber) -> bool {
        self.end.as_ref().is_some_and(|end| number > end)
    }
}

/// Selects the chapters inside `range`, keeping listing order
///
/// Selection stops at the first chapter whose number exceeds the end bound,
/// even if later chapters would fall inside the range again. Listings are
/// expected to be ordered by chapter number.
pub fn select(chapters: &[ChapterDescriptor], range: &ChapterRange) -> Vec<ChapterDescriptor> {
    let mut selected = Vec::new();

    for chapter in chapters {
        if range.exceeds_end(&chapter.number) {
            tracing::debug!(
                "Chapter {} exceeds {}, stopping selection",
                chapter.number,
                range.end().map(ToString::to_string).unwrap_or_default()
            );
            break;
        }

        if range.contains(&chapter.number) {
            selected.push(chapter.clone());
        }
    }

    selected
}
