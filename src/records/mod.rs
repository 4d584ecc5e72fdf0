//! Record parsing: raw table rows and text lines into voter records.
//!
//! Both modes validate every record with [`crate::validate`] before
//! handing it out. Rows or lines that cannot become a record are reported
//! as [`ParseError`]s; they never stop the page.

mod header;
mod name;
mod table;
mod text;

use thiserror::Error;

pub use header::parse_header;
pub use name::split_name;
pub use table::{parse_row, parse_rows};
pub use text::{parse_lines, select_layout};

/// A row or line that did not yield a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: {reason}")]
pub struct ParseError {
    /// 1-based row (table mode) or line (text mode) index
    pub row: usize,
    /// Why the row was rejected
    pub reason: String,
}

impl ParseError {
    pub(crate) fn new(row: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            reason: reason.into(),
        }
    }
}
