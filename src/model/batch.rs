//! Records collected from one source document.

use std::path::{Path, PathBuf};

use super::header::RollHeader;
use super::record::VoterRecord;
use super::result::{Issue, IssueKind};

/// Records and metadata gathered from one input PDF.
///
/// Built page by page by the orchestrator, then [`finish`](Self::finish)ed
/// and handed to the writer.
#[derive(Debug, Clone)]
pub struct ExtractionBatch {
    source: PathBuf,
    header: RollHeader,
    records: Vec<VoterRecord>,
    issues: Vec<Issue>,
    text_pages: usize,
}

impl ExtractionBatch {
    /// Start an empty batch for a source file.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            header: RollHeader::default(),
            records: Vec::new(),
            issues: Vec::new(),
            text_pages: 0,
        }
    }

    /// Source PDF path.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Merged roll header.
    pub fn header(&self) -> &RollHeader {
        &self.header
    }

    /// Records in encounter order.
    pub fn records(&self) -> &[VoterRecord] {
        &self.records
    }

    /// Issues in encounter order.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record was collected.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any page carried text.
    pub fn has_text(&self) -> bool {
        self.text_pages > 0
    }

    /// Note a page that produced text.
    pub fn add_text_page(&mut self) {
        self.text_pages += 1;
    }

    /// Merge header values from one page; earlier pages win.
    pub fn merge_header(&mut self, header: RollHeader) {
        self.header.merge(header);
    }

    /// Add a record, turning its validation warnings into issues.
    pub fn push_record(&mut self, page: u32, row: usize, record: VoterRecord) {
        for warning in &record.warnings {
            self.issues.push(
                Issue::new(IssueKind::ValidationWarning, page, warning.to_string()).at_row(row),
            );
        }
        self.records.push(record);
    }

    /// Add an issue.
    pub fn push_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Fill blank state/AC/part cells from the header.
    pub fn finish(mut self) -> Self {
        for record in &mut self.records {
            fill_blank(&mut record.st_code, self.header.state_code.as_deref());
            fill_blank(&mut record.ac_no, self.header.ac_no.as_deref());
            fill_blank(&mut record.part_no, self.header.part_no.as_deref());
        }
        self
    }

    /// Unsanitized output name: `{part}_{booth}_{ac}_{state}`.
    ///
    /// Header values are preferred, with the state name standing in for a
    /// missing state code. The first record supplies anything the header
    /// lacks, and the booth name defaults to `Part{part}`.
    pub fn output_stem(&self) -> String {
        let first = self.records.first();
        let pick = |header: &Option<String>, field: fn(&VoterRecord) -> &str| -> String {
            header
                .clone()
                .or_else(|| first.map(|r| field(r).to_string()))
                .unwrap_or_default()
        };

        let part = pick(&self.header.part_no, |r| r.part_no.as_str());
        let ac = pick(&self.header.ac_no, |r| r.ac_no.as_str());
        let state = pick(
            &self.header.state_code.clone().or_else(|| self.header.state_name.clone()),
            |r| r.st_code.as_str(),
        );
        let booth = match &self.header.booth_name {
            Some(name) => name.clone(),
            None if !part.is_empty() => format!("Part{}", part),
            None => self
                .source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        format!("{}_{}_{}_{}", part, booth, ac, state)
    }

    /// Consume the batch, returning its issues.
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

fn fill_blank(cell: &mut String, value: Option<&str>) {
    if cell.is_empty() {
        if let Some(value) = value {
            cell.push_str(value);
        }
    }
}
