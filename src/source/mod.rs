//! Source model for Scan-Harvest
//!
//! This module describes what the pipeline is pointed at: the input URL and
//! its kind, exact chapter numbers, and the rules for turning references found
//! on a page into absolute URLs and file names.

mod number;
mod reference;
mod resolve;

pub use number::ChapterNumber;
pub use reference::{ReferenceKind, SeriesReference};
pub use resolve::{file_name_from_url, resolve_reference};
