//! Reassembles spans into reading-order text lines.
//!
//! Electoral rolls are frequently printed as two or three voter columns per
//! page. Spans are first split at vertical gutters, then grouped into lines
//! within each column, so one line never mixes two voters.

use std::cmp::Ordering;

use super::spans::TextSpan;

/// Narrowest empty band accepted as a gutter (points).
const MIN_GUTTER_WIDTH: f32 = 12.0;
/// Narrowest column accepted on either side of a gutter (points).
const MIN_COLUMN_WIDTH: f32 = 80.0;
/// Pages narrower than this are always single-column.
const MIN_SPLIT_WIDTH: f32 = 250.0;
/// Fraction of the font size two baselines may differ by on one line.
const LINE_Y_TOLERANCE: f32 = 0.3;

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Spans sorted by X position
    pub spans: Vec<TextSpan>,
    /// Baseline Y position
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
}

impl TextLine {
    /// Create a line from spans, sorting them left to right.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
        let y = spans.first().map(|s| s.y).unwrap_or(0.0);
        let x = spans.first().map(|s| s.x).unwrap_or(0.0);
        Self { spans, y, x }
    }

    /// Combined text of the spans.
    ///
    /// A space is inserted where the gap between two spans is wider than a
    /// fifth of a glyph, unless one side already carries whitespace.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - prev.right();
                let glyph = span.width / span.text.chars().count().max(1) as f32;
                let has_space = prev.text.ends_with(char::is_whitespace)
                    || span.text.starts_with(char::is_whitespace);
                if gap > glyph * 0.2 && !has_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }

        result
    }
}

/// Horizontal extent of one detected text column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextColumn {
    /// Left boundary X coordinate
    pub left: f32,
    /// Right boundary X coordinate
    pub right: f32,
}

impl TextColumn {
    /// Whether a span's center falls within this column.
    pub fn contains_span(&self, span: &TextSpan) -> bool {
        let center = span.x + span.width / 2.0;
        center >= self.left && center < self.right
    }
}

/// Split the page into text columns at empty vertical bands.
///
/// Every gutter at least [`MIN_GUTTER_WIDTH`] wide is used, provided the
/// columns on both sides stay at least [`MIN_COLUMN_WIDTH`] wide.
pub fn detect_columns(spans: &[TextSpan]) -> Vec<TextColumn> {
    let mut intervals: Vec<(f32, f32)> = spans
        .iter()
        .map(|s| (s.x, s.right()))
        .filter(|(left, right)| left.is_finite() && right.is_finite())
        .collect();
    intervals.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let min_x = intervals.first().map(|i| i.0).unwrap_or(0.0);
    let max_x = intervals.iter().map(|i| i.1).fold(min_x, f32::max);

    if intervals.is_empty() || max_x - min_x < MIN_SPLIT_WIDTH {
        return vec![TextColumn {
            left: f32::NEG_INFINITY,
            right: f32::INFINITY,
        }];
    }

    // Centers of sufficiently wide empty bands between covered intervals.
    let mut gutters = Vec::new();
    let mut covered = min_x;
    for (left, right) in intervals {
        if left - covered >= MIN_GUTTER_WIDTH {
            gutters.push(covered + (left - covered) / 2.0);
        }
        covered = covered.max(right);
    }

    let mut columns = Vec::new();
    let mut left = f32::NEG_INFINITY;
    let mut left_edge = min_x;
    for gutter in gutters {
        if gutter - left_edge < MIN_COLUMN_WIDTH || max_x - gutter < MIN_COLUMN_WIDTH {
            continue;
        }
        columns.push(TextColumn {
            left,
            right: gutter,
        });
        left = gutter;
        left_edge = gutter;
    }
    columns.push(TextColumn {
        left,
        right: f32::INFINITY,
    });

    log::debug!("detected {} text column(s)", columns.len());
    columns
}

/// Group spans into lines, column by column, in top-to-bottom order.
///
/// Lines of the same height are ordered left column first, so a row of
/// voter boxes reads left to right.
pub fn assemble_lines(spans: Vec<TextSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    let columns = detect_columns(&spans);
    let mut per_column: Vec<Vec<TextSpan>> = vec![Vec::new(); columns.len()];
    for span in spans {
        let idx = columns
            .iter()
            .position(|c| c.contains_span(&span))
            .unwrap_or(0);
        per_column[idx].push(span);
    }

    let mut lines: Vec<(usize, TextLine)> = per_column
        .into_iter()
        .enumerate()
        .flat_map(|(idx, col_spans)| {
            group_single_column(col_spans)
                .into_iter()
                .map(move |line| (idx, line))
        })
        .collect();

    lines.sort_by(|(col_a, a), (col_b, b)| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then(col_a.cmp(col_b))
    });

    lines.into_iter().map(|(_, line)| line).collect()
}

/// Y-based line grouping within one column.
fn group_single_column(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * LINE_Y_TOLERANCE;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Render spans as page text, one line per text line.
pub fn page_text(spans: Vec<TextSpan>) -> String {
    assemble_lines(spans)
        .iter()
        .map(TextLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}
