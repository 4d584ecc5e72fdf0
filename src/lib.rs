//! # voterroll
//!
//! Extract voter records from electoral-roll PDFs into spreadsheets.
//!
//! Each input PDF is read page by page. Pages whose text lines up in
//! columns are parsed as tables, one voter per row; other pages are
//! matched line by line against an ordered list of text layouts. Records
//! are validated (EPIC number, age, gender) and written to one `.xlsx`
//! file per input with a fixed 17-column layout.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use voterroll::{extract, ExtractConfig};
//!
//! fn main() -> voterroll::Result<()> {
//!     let config = ExtractConfig::default();
//!     let results = extract(&[PathBuf::from("rolls/")], Path::new("out"), &config)?;
//!
//!     for result in &results {
//!         println!("{}: {} records", result.source.display(), result.records);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Progress and cancellation
//!
//! [`ExtractionWorker`] runs the same pipeline on a background thread and
//! streams [`ExtractEvent`]s over a channel; [`CancelHandle::cancel`] stops
//! the run between files.

pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod records;
pub mod validate;
pub mod worker;
pub mod writer;

// Re-export commonly used types
pub use config::{ExtractConfig, LayoutKind, TextLayout, SHEET_NAME};
pub use error::{Error, Result};
pub use model::{
    Column, ExtractionBatch, ExtractionResult, Gender, Issue, IssueKind, RelationType, RollHeader,
    ValidationWarning, VoterRecord,
};
pub use pipeline::{extract, ExtractEvent, ExtractEvents, NoEvents, Orchestrator};
pub use worker::{CancelHandle, ExtractionWorker};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
