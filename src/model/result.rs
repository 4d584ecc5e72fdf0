//! Per-file extraction outcome.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Category of a non-fatal problem found while extracting a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A page could not be read and was skipped
    PageError,
    /// No text layout matched a text page
    PatternMismatch,
    /// A table row or text line could not become a record
    RowError,
    /// A record was kept but a field failed validation
    ValidationWarning,
}

impl IssueKind {
    /// Whether this issue counts as a failure (data was lost).
    pub fn is_failure(&self) -> bool {
        matches!(self, IssueKind::PageError | IssueKind::RowError)
    }
}

/// One problem descriptor, located by page and row where known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// What went wrong
    pub kind: IssueKind,
    /// 1-based page number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// 1-based row (table mode) or line (text mode) within the page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Human-readable description
    pub reason: String,
}

impl Issue {
    /// Create an issue on a page.
    pub fn new(kind: IssueKind, page: u32, reason: impl Into<String>) -> Self {
        Self {
            kind,
            page: Some(page),
            row: None,
            reason: reason.into(),
        }
    }

    /// Attach a row index.
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.page, self.row) {
            (Some(page), Some(row)) => write!(f, "page {} row {}: {}", page, row, self.reason),
            (Some(page), None) => write!(f, "page {}: {}", page, self.reason),
            _ => f.write_str(&self.reason),
        }
    }
}

/// Outcome of extracting one input file.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Input PDF
    pub source: PathBuf,
    /// Spreadsheet written, if any
    pub output: Option<PathBuf>,
    /// Records written
    pub records: usize,
    /// Pages and rows lost to errors
    pub failures: usize,
    /// Soft problems, in encounter order
    pub issues: Vec<Issue>,
    /// Whole-file failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    /// Result for a file that was written.
    pub fn written(source: PathBuf, output: PathBuf, records: usize, issues: Vec<Issue>) -> Self {
        let failures = issues.iter().filter(|i| i.kind.is_failure()).count();
        Self {
            source,
            output: Some(output),
            records,
            failures,
            issues,
            error: None,
        }
    }

    /// Result for a file that failed entirely.
    pub fn failed(source: PathBuf, error: impl fmt::Display, issues: Vec<Issue>) -> Self {
        let failures = issues.iter().filter(|i| i.kind.is_failure()).count();
        Self {
            source,
            output: None,
            records: 0,
            failures,
            issues,
            error: Some(error.to_string()),
        }
    }

    /// Whether the file produced a spreadsheet.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Number of issues of one kind.
    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_counting() {
        let issues = vec![
            Issue::new(IssueKind::RowError, 1, "row has 12 cells").at_row(4),
            Issue::new(IssueKind::ValidationWarning, 1, "age 7 out of range").at_row(5),
            Issue::new(IssueKind::PageError, 2, "bad stream"),
        ];
        let result = ExtractionResult::written("a.pdf".into(), "a.xlsx".into(), 10, issues);

        assert!(result.is_success());
        assert_eq!(result.failures, 2);
        assert_eq!(result.count(IssueKind::ValidationWarning), 1);
        assert_eq!(result.issues[0].to_string(), "page 1 row 4: row has 12 cells");
    }

    #[test]
    fn test_failed_result_serializes() {
        let result = ExtractionResult::failed("scan.pdf".into(), "no text extracted", vec![]);
        assert!(!result.is_success());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"], "no text extracted");
        assert_eq!(json["records"], 0);
        assert!(json["output"].is_null());
    }
}
