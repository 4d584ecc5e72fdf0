//! One input PDF, opened for the duration of a single extraction pass.

use std::path::{Path, PathBuf};

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::detect::sniff_pdf_version;
use crate::error::{Error, Result};

use super::spans::{SpanCollector, TextSpan};

/// An opened electoral-roll PDF.
///
/// The underlying document is owned by this value and released when it is
/// dropped, so a document opened inside one file's extraction scope is
/// closed on every exit path of that scope, including parse failures.
pub struct SourceDocument {
    path: PathBuf,
    version: String,
    doc: LopdfDocument,
}

impl SourceDocument {
    /// Open a PDF file.
    ///
    /// Non-PDF, corrupt and undecryptable files are rejected here; they are
    /// whole-document failures. Files protected only by an owner password
    /// are decrypted by the loader and read normally.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let version = sniff_pdf_version(path)?;

        let doc = LopdfDocument::load(path).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            version,
            doc,
        })
    }

    /// Load a PDF from memory.
    pub fn from_bytes(path: impl Into<PathBuf>, data: &[u8]) -> Result<Self> {
        let version = crate::detect::pdf_version_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;

        Ok(Self {
            path: path.into(),
            version,
            doc,
        })
    }

    /// Path the document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// PDF version from the file header.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Page numbers in document order (1-based).
    pub fn page_numbers(&self) -> Vec<u32> {
        self.doc.get_pages().into_keys().collect()
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Extract positioned text spans from one page.
    pub fn page_spans(&self, page_num: u32) -> Result<Vec<TextSpan>> {
        let pages = self.doc.get_pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;

        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::TextExtract(format!("page {}: {}", page_num, e)))?;

        let content = self.page_content(page_id)?;
        SpanCollector::new(&self.doc, fonts).collect(&content)
    }

    /// Concatenated, decompressed content streams of a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::Corrupted(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without a content stream is blank.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => {
                    Ok(s.decompressed_content().unwrap_or_else(|_| s.content.clone()))
                }
                Ok(Object::Array(arr)) => Ok(self.concat_streams(arr)),
                _ => Err(Error::Corrupted("invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::Corrupted("invalid content stream".to_string())),
        }
    }

    fn concat_streams(&self, refs: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in refs {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    match s.decompressed_content() {
                        Ok(data) => content.extend_from_slice(&data),
                        Err(_) => content.extend_from_slice(&s.content),
                    }
                    content.push(b' ');
                }
            }
        }
        content
    }
}

impl std::fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDocument")
            .field("path", &self.path)
            .field("version", &self.version)
            .field("pages", &self.page_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"this is not a pdf at all").unwrap();

        let err = SourceDocument::open(&path).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat));
        assert!(err.is_document_error());
    }

    #[test]
    fn test_from_bytes_rejects_html() {
        let err = SourceDocument::from_bytes("page.pdf", b"<html></html>").unwrap_err();
        assert!(matches!(err, Error::UnknownFormat));
    }

    #[test]
    fn test_open_missing_file() {
        let err = SourceDocument::open("/nonexistent/roll.pdf").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
