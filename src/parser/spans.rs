//! Positioned text spans decoded from PDF content streams.

use std::collections::BTreeMap;

use lopdf::{Document as LopdfDocument, Object};

use crate::error::{Error, Result};

/// Approximate glyph advance as a fraction of the font size, used when the
/// content stream does not tell us how wide a run of text is.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Kerning adjustment (thousandths of an em) treated as a word break in `TJ`.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A text span with position and font information.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
}

impl TextSpan {
    /// Create a new text span, estimating its width from the glyph count.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        let text = text.into();
        let width = text.chars().count() as f32 * font_size * AVG_GLYPH_WIDTH;
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }

    /// Right edge of the span.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            leading: 12.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, m: [f32; 6]) {
        let leading = self.leading;
        *self = Self {
            a: m[0],
            b: m[1],
            c: m[2],
            d: m[3],
            e: m[4],
            f: m[5],
            leading,
        };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Walks one page's content stream and collects its text spans.
pub(crate) struct SpanCollector<'a> {
    doc: &'a LopdfDocument,
    fonts: BTreeMap<Vec<u8>, &'a lopdf::Dictionary>,
}

impl<'a> SpanCollector<'a> {
    pub(crate) fn new(doc: &'a LopdfDocument, fonts: BTreeMap<Vec<u8>, &'a lopdf::Dictionary>) -> Self {
        Self { doc, fonts }
    }

    /// Decode a raw content stream into spans.
    pub(crate) fn collect(&self, content: &[u8]) -> Result<Vec<TextSpan>> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut spans = Vec::new();
        let mut font_name: Vec<u8> = Vec::new();
        let mut font_size: f32 = 12.0;
        let mut matrix = TextMatrix::default();
        let mut line_start = TextMatrix::default();
        let mut in_text_block = false;

        for op in content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "BT" => {
                    in_text_block = true;
                    matrix = TextMatrix::default();
                    line_start = matrix.clone();
                }
                "ET" => in_text_block = false,
                "Tf" if operands.len() >= 2 => {
                    if let Object::Name(name) = &operands[0] {
                        font_name = name.clone();
                    }
                    font_size = get_number(&operands[1]).unwrap_or(12.0);
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        matrix.leading = leading;
                        line_start.leading = leading;
                    }
                }
                "Td" | "TD" if operands.len() >= 2 => {
                    let tx = get_number(&operands[0]).unwrap_or(0.0);
                    let ty = get_number(&operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        line_start.leading = -ty;
                    }
                    line_start.translate(tx, ty);
                    matrix = line_start.clone();
                }
                "Tm" if operands.len() >= 6 => {
                    let mut m = [0.0f32; 6];
                    for (slot, operand) in m.iter_mut().zip(operands.iter()) {
                        *slot = get_number(operand).unwrap_or(0.0);
                    }
                    matrix.set(m);
                    line_start = matrix.clone();
                }
                "T*" => {
                    line_start.next_line();
                    matrix = line_start.clone();
                }
                "Tj" | "TJ" | "'" | "\"" if in_text_block => {
                    if matches!(op.operator.as_str(), "'" | "\"") {
                        line_start.next_line();
                        matrix = line_start.clone();
                    }
                    let text = match op.operator.as_str() {
                        "TJ" => self.decode_array(&font_name, operands.first()),
                        "\"" => self.decode_operand(&font_name, operands.get(2)),
                        _ => self.decode_operand(&font_name, operands.first()),
                    };
                    if !text.trim().is_empty() {
                        let (x, y) = matrix.position();
                        let span = TextSpan::new(text, x, y, font_size * matrix.scale());
                        // Advance so a following Tj without repositioning lands after this run.
                        matrix.translate(span.width / matrix.scale().max(f32::EPSILON), 0.0);
                        spans.push(span);
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    fn decode_operand(&self, font_name: &[u8], operand: Option<&Object>) -> String {
        match operand {
            Some(Object::String(bytes, _)) => self.decode_bytes(font_name, bytes),
            _ => String::new(),
        }
    }

    /// Decode a `TJ` array; large negative kerning becomes a space.
    fn decode_array(&self, font_name: &[u8], operand: Option<&Object>) -> String {
        let Some(Object::Array(items)) = operand else {
            return String::new();
        };

        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode_bytes(font_name, bytes)),
                other => {
                    let adjustment = -get_number(other).unwrap_or(0.0);
                    if adjustment > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(' ')
                    {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }

    fn decode_bytes(&self, font_name: &[u8], bytes: &[u8]) -> String {
        self.fonts
            .get(font_name)
            .and_then(|font| font.get_font_encoding(self.doc).ok())
            .and_then(|encoding| LopdfDocument::decode_text(&encoding, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }
}

/// Extract a number from a PDF operand.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decoding fallback when the font has no usable encoding.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_width_estimate() {
        let span = TextSpan::new("ABCD", 10.0, 100.0, 10.0);
        assert!((span.width - 20.0).abs() < f32::EPSILON);
        assert!((span.right() - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"S04"), "S04");
        assert_eq!(decode_text_simple(&[0x48, 0xE9]), "Hé");
        // UTF-16BE BOM + "पि" (U+092A U+093F)
        assert_eq!(
            decode_text_simple(&[0xFE, 0xFF, 0x09, 0x2A, 0x09, 0x3F]),
            "पि"
        );
    }

    #[test]
    fn test_text_matrix_td_and_leading() {
        let mut m = TextMatrix::default();
        m.set([2.0, 0.0, 0.0, 2.0, 50.0, 700.0]);
        m.translate(10.0, -5.0);
        assert_eq!(m.position(), (70.0, 690.0));
        assert!((m.scale() - 2.0).abs() < f32::EPSILON);

        m.leading = 14.0;
        m.next_line();
        assert_eq!(m.position(), (70.0, 662.0));
    }
}
