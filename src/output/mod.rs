//! Output module for everything a run leaves on disk
//!
//! This module handles:
//! - The directory layout of series and chapter workspaces
//! - The append-only run log
//! - Assembling chapter images into one document
//! - Summarising a run for the terminal

pub mod document;
pub mod layout;
pub mod run_log;
pub mod stats;

pub use document::{AssemblyReport, DocumentAssembler, DOCUMENT_FILE};
pub use layout::{sanitize_component, OutputLayout};
pub use run_log::{RunEvent, RunLog, RUN_LOG_FILE};
pub use stats::{print_summary, ChapterReport, RunSummary};
