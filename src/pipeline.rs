//! Batch orchestration: input discovery, per-file extraction and progress
//! events.
//!
//! Files are processed strictly one after another, and pages within a file
//! in order, so at most one document is open at a time.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::ExtractConfig;
use crate::detect::has_pdf_extension;
use crate::error::{Error, Result};
use crate::model::{ExtractionBatch, ExtractionResult, Issue, IssueKind, VoterRecord};
use crate::parser::{ExtractedPage, LayoutDetector, PageContent, PageExtractor, SourceDocument};
use crate::records::{parse_header, parse_lines, parse_rows, select_layout, ParseError};
use crate::writer::SpreadsheetWriter;

/// Progress notifications emitted during a run.
#[derive(Debug, Clone)]
pub enum ExtractEvent {
    /// Inputs were discovered; processing is about to start.
    Started { total: usize },
    /// A file is about to be processed.
    FileStarted {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    /// A file finished, successfully or not.
    FileCompleted {
        processed: usize,
        total: usize,
        result: ExtractionResult,
    },
    /// The run stopped early on request; no more events follow.
    Cancelled { processed: usize, total: usize },
    /// All files were processed; no more events follow.
    Completed { processed: usize, total: usize },
}

/// Receives extraction events and decides whether to keep going.
pub trait ExtractEvents {
    fn on_event(&mut self, event: ExtractEvent);
    fn do_continue(&self) -> bool;
}

/// Event sink that ignores everything and never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEvents;

impl ExtractEvents for NoEvents {
    fn on_event(&mut self, _event: ExtractEvent) {}

    fn do_continue(&self) -> bool {
        true
    }
}

/// Expand inputs into the list of PDF files to process.
///
/// Directories are walked (recursively when `recursive` is set) and their
/// PDFs returned in file-name order. Explicit files must carry a `.pdf`
/// extension; other files are skipped with a warning. A path that does not
/// exist is an error.
pub fn discover_inputs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut walker = WalkDir::new(input).sort_by_file_name();
            if !recursive {
                walker = walker.max_depth(1);
            }
            for entry in walker {
                let entry = entry?;
                if entry.file_type().is_file() && has_pdf_extension(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if input.is_file() {
            if has_pdf_extension(input) {
                files.push(input.clone());
            } else {
                log::warn!("{}: not a .pdf file, skipped", input.display());
            }
        } else {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("input not found: {}", input.display()),
            )));
        }
    }

    Ok(files)
}

/// Create the output directory if needed and check that it accepts files.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    let not_writable = |e: io::Error| {
        log::debug!("{}: {}", dir.display(), e);
        Error::OutputNotWritable(dir.to_path_buf())
    };

    fs::create_dir_all(dir).map_err(not_writable)?;

    let probe = dir.join(format!(".voterroll-probe-{}", std::process::id()));
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe)
        .map_err(not_writable)?;
    fs::remove_file(&probe).map_err(not_writable)?;
    Ok(())
}

/// Runs extraction over a set of inputs.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator<'c> {
    config: &'c ExtractConfig,
}

impl<'c> Orchestrator<'c> {
    /// Create an orchestrator sharing a configuration.
    pub fn new(config: &'c ExtractConfig) -> Self {
        Self { config }
    }

    /// Process every input, writing one spreadsheet per PDF into
    /// `output_dir`.
    ///
    /// Only precondition failures are returned as `Err`: an invalid
    /// configuration, an unwritable output directory, a missing input or no
    /// PDF inputs at all. Per-file failures are reported in the returned
    /// results and never stop the run. Cancellation is checked between
    /// files; results for the files already done are returned.
    pub fn run(
        &self,
        inputs: &[PathBuf],
        output_dir: &Path,
        events: &mut dyn ExtractEvents,
    ) -> Result<Vec<ExtractionResult>> {
        self.config.validate()?;
        ensure_output_dir(output_dir)?;

        let files = discover_inputs(inputs, self.config.recursive)?;
        if files.is_empty() {
            return Err(Error::NoInputs);
        }

        let total = files.len();
        log::info!("{} PDF file(s) to process", total);
        events.on_event(ExtractEvent::Started { total });

        let mut writer = SpreadsheetWriter::new(output_dir, self.config);
        let mut results = Vec::with_capacity(total);

        for (index, path) in files.iter().enumerate() {
            if !events.do_continue() {
                log::info!("cancelled after {} of {} file(s)", index, total);
                events.on_event(ExtractEvent::Cancelled {
                    processed: index,
                    total,
                });
                return Ok(results);
            }

            events.on_event(ExtractEvent::FileStarted {
                index,
                total,
                path: path.clone(),
            });

            let result = self.process_file(path, &mut writer);
            results.push(result.clone());
            events.on_event(ExtractEvent::FileCompleted {
                processed: index + 1,
                total,
                result,
            });
        }

        events.on_event(ExtractEvent::Completed {
            processed: total,
            total,
        });
        Ok(results)
    }

    /// Extract and write one file. Never fails; failures are in the result.
    pub fn process_file(&self, path: &Path, writer: &mut SpreadsheetWriter<'_>) -> ExtractionResult {
        log::info!("processing {}", path.display());

        let batch = match self.extract_batch(path) {
            Ok(batch) => batch,
            Err(err) => {
                log::warn!("{}: {}", path.display(), err);
                return ExtractionResult::failed(path.to_path_buf(), err, Vec::new());
            }
        };

        if !batch.has_text() {
            log::warn!("{}: {}", path.display(), Error::NoText);
            return ExtractionResult::failed(path.to_path_buf(), Error::NoText, batch.into_issues());
        }
        if batch.is_empty() {
            log::warn!("{}: {}", path.display(), Error::NoRecords);
            return ExtractionResult::failed(path.to_path_buf(), Error::NoRecords, batch.into_issues());
        }

        let batch = batch.finish();
        match writer.write(&batch) {
            Ok(output) => {
                let records = batch.len();
                ExtractionResult::written(path.to_path_buf(), output, records, batch.into_issues())
            }
            Err(err) => {
                log::warn!("{}: {}", path.display(), err);
                ExtractionResult::failed(path.to_path_buf(), err, batch.into_issues())
            }
        }
    }

    /// Read every page of one PDF into a batch.
    ///
    /// The document stays open only for the duration of this call. Errors
    /// opening it are whole-file failures; errors on a single page are
    /// recorded and the remaining pages are still read.
    pub fn extract_batch(&self, path: &Path) -> Result<ExtractionBatch> {
        let source = SourceDocument::open(path)?;
        let layout = LayoutDetector::new(self.config.table_detector_config());
        let extractor = PageExtractor::new(&source, layout);
        let mut batch = ExtractionBatch::new(path);

        for page_num in source.page_numbers() {
            match extractor.extract_page(page_num) {
                Ok(page) => self.collect_page(&mut batch, &page),
                Err(err) => {
                    log::warn!("{}: page {} skipped: {}", path.display(), page_num, err);
                    batch.push_issue(Issue::new(IssueKind::PageError, page_num, err.to_string()));
                }
            }
        }

        log::debug!(
            "{}: {} record(s), {} issue(s)",
            path.display(),
            batch.len(),
            batch.issues().len()
        );
        Ok(batch)
    }

    fn collect_page(&self, batch: &mut ExtractionBatch, page: &ExtractedPage) {
        if !page.has_text() {
            log::debug!("page {}: no text", page.number);
            return;
        }
        batch.add_text_page();
        batch.merge_header(parse_header(&page.text));

        match &page.content {
            PageContent::Rows(rows) => {
                for outcome in parse_rows(rows, self.config) {
                    push_outcome(batch, page.number, outcome);
                }
            }
            PageContent::Text(text) => match select_layout(text, self.config) {
                Some(layout) => {
                    log::debug!("page {}: text layout '{}'", page.number, layout.name());
                    for outcome in parse_lines(text, layout, self.config) {
                        push_outcome(batch, page.number, outcome);
                    }
                }
                None => {
                    log::warn!("page {}: no pattern matched", page.number);
                    batch.push_issue(Issue::new(
                        IssueKind::PatternMismatch,
                        page.number,
                        "no pattern matched",
                    ));
                }
            },
        }
    }
}

fn push_outcome(
    batch: &mut ExtractionBatch,
    page: u32,
    outcome: std::result::Result<(usize, VoterRecord), ParseError>,
) {
    match outcome {
        Ok((row, record)) => batch.push_record(page, row, record),
        Err(err) => {
            log::warn!("page {}: {}", page, err);
            batch.push_issue(Issue::new(IssueKind::RowError, page, err.reason).at_row(err.row));
        }
    }
}

/// Run extraction with a configuration and no progress reporting.
pub fn extract(
    inputs: &[PathBuf],
    output_dir: &Path,
    config: &ExtractConfig,
) -> Result<Vec<ExtractionResult>> {
    Orchestrator::new(config).run(inputs, output_dir, &mut NoEvents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_inputs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.pdf"), b"").unwrap();
        fs::write(dir.path().join("A.PDF"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.pdf"), b"").unwrap();

        let files = discover_inputs(&[dir.path().to_path_buf()], true).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("A.PDF"),
                PathBuf::from("b.pdf"),
                PathBuf::from("sub").join("c.pdf"),
            ]
        );

        let shallow = discover_inputs(&[dir.path().to_path_buf()], false).unwrap();
        assert_eq!(shallow.len(), 2);
    }

    #[test]
    fn test_discover_inputs_missing_path() {
        let err = discover_inputs(&[PathBuf::from("/nonexistent/rolls")], true).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_ensure_output_dir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        ensure_output_dir(&out).unwrap();
        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_ensure_output_dir_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            ensure_output_dir(&file),
            Err(Error::OutputNotWritable(_))
        ));
    }

    #[test]
    fn test_run_without_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let config = ExtractConfig::default();
        let err = extract(&[dir.path().to_path_buf()], &out, &config).unwrap_err();
        assert!(matches!(err, Error::NoInputs));
    }

    #[test]
    fn test_bad_file_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.pdf"), b"not a pdf").unwrap();
        fs::write(dir.path().join("b.pdf"), b"%PDF-1.4 truncated").unwrap();
        let out = dir.path().join("out");

        let results = extract(&[dir.path().to_path_buf()], &out, &ExtractConfig::default()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.is_success() && r.output.is_none()));
    }

    struct CancelAfterFirst {
        events: Vec<String>,
        completed: usize,
    }

    impl ExtractEvents for CancelAfterFirst {
        fn on_event(&mut self, event: ExtractEvent) {
            let name = match event {
                ExtractEvent::Started { .. } => "started",
                ExtractEvent::FileStarted { .. } => "file-started",
                ExtractEvent::FileCompleted { .. } => {
                    self.completed += 1;
                    "file-completed"
                }
                ExtractEvent::Cancelled { .. } => "cancelled",
                ExtractEvent::Completed { .. } => "completed",
            };
            self.events.push(name.to_string());
        }

        fn do_continue(&self) -> bool {
            self.completed == 0
        }
    }

    #[test]
    fn test_cancellation_between_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            fs::write(dir.path().join(name), b"junk").unwrap();
        }
        let out = dir.path().join("out");
        let config = ExtractConfig::default();
        let mut events = CancelAfterFirst {
            events: Vec::new(),
            completed: 0,
        };

        let results = Orchestrator::new(&config)
            .run(&[dir.path().to_path_buf()], &out, &mut events)
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(
            events.events,
            vec!["started", "file-started", "file-completed", "cancelled"]
        );
    }
}
