//! Error types for pdfoutline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdfoutline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building an outline.
///
/// Every variant is fatal to the document it is returned for. Failures that
/// only affect one page never surface as an `Error` from the pipeline; they
/// are downgraded to [`crate::model::PageWarning`]s.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// The document has more pages than the configured ceiling.
    #[error("PDF exceeds {limit}-page limit ({pages} pages)")]
    PageLimitExceeded { pages: usize, limit: usize },

    /// The language identification model is unavailable or failed.
    #[error("Language model error: {0}")]
    LanguageModel(String),

    /// Error extracting text content from a page.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// A path resolved outside the configured root directory.
    #[error("Blocked path traversal: {}", .0.display())]
    PathOutsideRoot(PathBuf),

    /// Error during JSON rendering.
    #[error("Rendering error: {0}")]
    Render(String),

    /// An option value is out of its valid domain.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
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
