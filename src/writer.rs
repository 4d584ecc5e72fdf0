//! Spreadsheet writer: one `.xlsx` file per extraction batch.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use rust_xlsxwriter::{Format, Workbook};

use crate::config::ExtractConfig;
use crate::error::Result;
use crate::model::{CellValue, Column, ExtractionBatch, VoterRecord};

/// Extension of every output file.
pub const OUTPUT_EXTENSION: &str = "xlsx";

/// Padding added to the widest value of a column.
const WIDTH_PADDING: usize = 2;

/// Stem used when nothing usable is left after sanitizing.
const FALLBACK_STEM: &str = "electoral_roll";

struct NamePatterns {
    invalid: Regex,
    whitespace: Regex,
    underscores: Regex,
}

fn name_patterns() -> &'static NamePatterns {
    static PATTERNS: OnceLock<NamePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| NamePatterns {
        invalid: Regex::new(r"[^\w\s.\-]").expect("valid pattern"),
        whitespace: Regex::new(r"\s+").expect("valid pattern"),
        underscores: Regex::new(r"_{2,}").expect("valid pattern"),
    })
}

/// Turn a derived name into a safe file name with the `.xlsx` extension.
///
/// Characters other than word characters, whitespace, `.` and `-` are
/// dropped, whitespace runs become `_`, repeated underscores collapse and
/// leading or trailing underscores are trimmed.
pub fn sanitize_filename(stem: &str) -> String {
    let patterns = name_patterns();
    let cleaned = patterns.invalid.replace_all(stem, "");
    let cleaned = patterns.whitespace.replace_all(&cleaned, "_");
    let cleaned = patterns.underscores.replace_all(&cleaned, "_");
    let cleaned = cleaned.trim_matches('_');

    let stem = if cleaned.is_empty() { FALLBACK_STEM } else { cleaned };
    format!("{}.{}", stem, OUTPUT_EXTENSION)
}

/// Column widths in characters: widest value plus padding, capped.
pub fn column_widths(records: &[VoterRecord], max_width: usize) -> Vec<usize> {
    Column::ALL
        .iter()
        .map(|&column| {
            let widest = records
                .iter()
                .map(|r| match r.value(column) {
                    CellValue::Text(s) => s.chars().count(),
                    CellValue::Number(n) => n.to_string().len(),
                    CellValue::Empty => 0,
                })
                .chain(std::iter::once(column.title().len()))
                .max()
                .unwrap_or(0);
            (widest + WIDTH_PADDING).min(max_width)
        })
        .collect()
}

/// Write records to `path` as a single-sheet workbook.
pub fn write_records(path: &Path, records: &[VoterRecord], config: &ExtractConfig) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(&config.sheet_name)?;

    for (col, column) in Column::ALL.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, column.title(), &bold)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, column) in Column::ALL.iter().enumerate() {
            match record.value(*column) {
                CellValue::Text(text) => {
                    sheet.write_string(row, col as u16, text)?;
                }
                CellValue::Number(n) => {
                    sheet.write_number(row, col as u16, n)?;
                }
                CellValue::Empty => {}
            }
        }
    }

    for (col, width) in column_widths(records, config.max_column_width).into_iter().enumerate() {
        sheet.set_column_width(col as u16, width as f64)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// Writes batches into one output directory without overwriting.
///
/// Names already written during this run, or already present on disk, get
/// a numeric suffix: `name.xlsx`, `name_1.xlsx`, `name_2.xlsx`, ...
#[derive(Debug)]
pub struct SpreadsheetWriter<'c> {
    config: &'c ExtractConfig,
    output_dir: PathBuf,
    used: HashSet<PathBuf>,
}

impl<'c> SpreadsheetWriter<'c> {
    /// Create a writer for an output directory.
    pub fn new(output_dir: impl Into<PathBuf>, config: &'c ExtractConfig) -> Self {
        Self {
            config,
            output_dir: output_dir.into(),
            used: HashSet::new(),
        }
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// First free path for a sanitized file name.
    pub fn unique_path(&self, file_name: &str) -> PathBuf {
        let candidate = self.output_dir.join(file_name);
        if self.is_free(&candidate) {
            return candidate;
        }

        let stem = file_name
            .strip_suffix(&format!(".{}", OUTPUT_EXTENSION))
            .unwrap_or(file_name);
        (1..)
            .map(|n| {
                self.output_dir
                    .join(format!("{}_{}.{}", stem, n, OUTPUT_EXTENSION))
            })
            .find(|path| self.is_free(path))
            .unwrap_or(candidate)
    }

    fn is_free(&self, path: &Path) -> bool {
        !self.used.contains(path) && !path.exists()
    }

    /// Write a finished batch, returning the file written.
    pub fn write(&mut self, batch: &ExtractionBatch) -> Result<PathBuf> {
        let file_name = sanitize_filename(&batch.output_stem());
        let path = self.unique_path(&file_name);

        write_records(&path, batch.records(), self.config)?;
        log::info!(
            "{}: wrote {} records to {}",
            batch.source().display(),
            batch.len(),
            path.display()
        );

        self.used.insert(path.clone());
        Ok(path)
    }
}
