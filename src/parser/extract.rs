//! Page/table extraction: raw rows or raw text per page.

use crate::error::Result;

use super::layout::{LayoutDetector, LayoutMode, PageLayout};
use super::lines::page_text;
use super::source::SourceDocument;

/// Raw content of one page in the form its layout calls for.
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    /// Table rows of cell strings, blank cells as empty strings
    Rows(Vec<Vec<String>>),
    /// Page text with line breaks
    Text(String),
}

/// One extracted page.
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// 1-based page number
    pub number: u32,
    /// Rows or text, per the page layout
    pub content: PageContent,
    /// Reading-order page text, used for header parsing in both modes
    pub text: String,
}

impl ExtractedPage {
    /// Layout mode the page was extracted in.
    pub fn mode(&self) -> LayoutMode {
        match self.content {
            PageContent::Rows(_) => LayoutMode::Table,
            PageContent::Text(_) => LayoutMode::Text,
        }
    }

    /// Whether the page carried any text at all.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Pulls pages out of a [`SourceDocument`].
#[derive(Debug)]
pub struct PageExtractor<'a> {
    source: &'a SourceDocument,
    layout: LayoutDetector,
}

impl<'a> PageExtractor<'a> {
    /// Create an extractor over an opened document.
    pub fn new(source: &'a SourceDocument, layout: LayoutDetector) -> Self {
        Self { source, layout }
    }

    /// Extract one page.
    ///
    /// Errors here concern this page only; callers record them and move on.
    pub fn extract_page(&self, page_num: u32) -> Result<ExtractedPage> {
        let spans = self.source.page_spans(page_num)?;
        let layout = self.layout.classify(&spans);
        log::debug!(
            "{}: page {} is {} ({} spans)",
            self.source.path().display(),
            page_num,
            layout.mode(),
            spans.len()
        );

        let text = page_text(spans);
        let content = match layout {
            PageLayout::Table(tables) => {
                PageContent::Rows(tables.iter().flat_map(|t| t.cells()).collect())
            }
            PageLayout::Text => PageContent::Text(text.clone()),
        };

        Ok(ExtractedPage {
            number: page_num,
            content,
            text,
        })
    }
}
