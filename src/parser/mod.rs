//! PDF parsing: text spans, line assembly, layout detection and page
//! extraction.

mod extract;
mod layout;
mod lines;
mod source;
mod spans;
mod table_detector;

pub use extract::{ExtractedPage, PageContent, PageExtractor};
pub use layout::{LayoutDetector, LayoutMode, PageLayout};
pub use lines::{assemble_lines, detect_columns, page_text, TextColumn, TextLine};
pub use source::SourceDocument;
pub use spans::TextSpan;
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig, TableRowData};
