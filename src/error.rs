//! Error types for voterroll.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for voterroll operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting electoral rolls.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not recognized as a PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and cannot be read.
    #[error("Document is encrypted")]
    Encrypted,

    /// The PDF structure is corrupted or malformed.
    #[error("Corrupted PDF structure: {0}")]
    Corrupted(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error extracting text content from a page.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// None of the document's pages produced any text (typically a scan).
    #[error("no text extracted")]
    NoText,

    /// The document had text but no voter record could be parsed from it.
    #[error("no voter records extracted")]
    NoRecords,

    /// A record pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration is inconsistent or could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error while writing the spreadsheet.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// The output directory cannot be created or written to.
    #[error("Output directory is not writable: {}", .0.display())]
    OutputNotWritable(PathBuf),

    /// No PDF files were found under the given inputs.
    #[error("No PDF files found in the given inputs")]
    NoInputs,

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error makes a whole input document unusable.
    ///
    /// Such errors are recorded as a failed `ExtractionResult` for that file
    /// and the batch continues with the next input.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::PdfParse(_)
                | Error::Encrypted
                | Error::Corrupted(_)
                | Error::NoText
                | Error::NoRecords
                | Error::Spreadsheet(_)
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        match err.into_io_error() {
            Some(e) => Error::Io(e),
            None => Error::Other("directory walk failed".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::NoText.to_string(), "no text extracted");
        assert_eq!(
            Error::PageOutOfRange(10, 5).to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
        assert_eq!(
            Error::OutputNotWritable(PathBuf::from("/out")).to_string(),
            "Output directory is not writable: /out"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_document_error());
    }

    #[test]
    fn test_soft_errors_are_not_document_errors() {
        assert!(!Error::Config("bad".into()).is_document_error());
        assert!(!Error::NoInputs.is_document_error());
        assert!(Error::NoRecords.is_document_error());
    }
}
