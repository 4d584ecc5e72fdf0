//! Per-page layout detection.
//!
//! A page is read as a table when the table detector finds a region with
//! enough aligned columns; anything else falls back to text matching.

use std::fmt;

use super::spans::TextSpan;
use super::table_detector::{DetectedTable, TableDetector, TableDetectorConfig};

/// How a page's records are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Aligned columns, one voter per row
    Table,
    /// Free text, one voter per line
    Text,
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMode::Table => f.write_str("table"),
            LayoutMode::Text => f.write_str("text"),
        }
    }
}

/// Layout decision for one page.
#[derive(Debug, Clone)]
pub enum PageLayout {
    /// Detected tables, top to bottom
    Table(Vec<DetectedTable>),
    /// No table found; records are matched line by line
    Text,
}

impl PageLayout {
    /// Mode of this layout.
    pub fn mode(&self) -> LayoutMode {
        match self {
            PageLayout::Table(_) => LayoutMode::Table,
            PageLayout::Text => LayoutMode::Text,
        }
    }
}

/// Decides table or text mode for each page.
#[derive(Debug, Clone)]
pub struct LayoutDetector {
    tables: TableDetector,
}

impl LayoutDetector {
    /// Create a detector using the given table settings.
    pub fn new(config: TableDetectorConfig) -> Self {
        Self {
            tables: TableDetector::with_config(config),
        }
    }

    /// Classify a page from its spans.
    pub fn classify(&self, spans: &[TextSpan]) -> PageLayout {
        let min_columns = self.tables.config().min_columns.max(2);
        let tables: Vec<DetectedTable> = self
            .tables
            .detect(spans)
            .into_iter()
            .filter(|t| t.column_count() >= min_columns)
            .collect();

        if tables.is_empty() {
            PageLayout::Text
        } else {
            PageLayout::Table(tables)
        }
    }
}

impl Default for LayoutDetector {
    fn default() -> Self {
        Self::new(TableDetectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_spans(columns: usize, rows: usize) -> Vec<TextSpan> {
        (0..rows)
            .flat_map(|r| {
                (0..columns).map(move |c| {
                    TextSpan::new(format!("{}", r * columns + c), 20.0 + c as f32 * 32.0, 700.0 - r as f32 * 12.0, 6.0)
                })
            })
            .collect()
    }

    #[test]
    fn test_aligned_rows_are_table() {
        let detector = LayoutDetector::default();
        let layout = detector.classify(&table_spans(17, 4));
        assert_eq!(layout.mode(), LayoutMode::Table);
        if let PageLayout::Table(tables) = layout {
            assert_eq!(tables[0].column_count(), 17);
        }
    }

    #[test]
    fn test_few_columns_fall_back_to_text() {
        let detector = LayoutDetector::default();
        assert_eq!(detector.classify(&table_spans(4, 6)).mode(), LayoutMode::Text);
    }

    #[test]
    fn test_min_columns_is_tunable() {
        let detector = LayoutDetector::new(TableDetectorConfig {
            min_columns: 3,
            ..Default::default()
        });
        assert_eq!(detector.classify(&table_spans(4, 6)).mode(), LayoutMode::Table);
    }

    #[test]
    fn test_empty_page_is_text() {
        assert_eq!(LayoutDetector::default().classify(&[]).mode(), LayoutMode::Text);
    }
}
