//! Error types for the mizan-core library.

use thiserror::Error;

/// Main error type for the mizan library.
#[derive(Error, Debug)]
pub enum MizanError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Backend-level error.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// No backend in the registry can run the requested comparison.
    #[error("no available backends to compare")]
    NoBackends,

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The file cannot be opened or read at all.
    #[error("failed to open {path}: {reason}")]
    Open { path: String, reason: String },

    /// Failed to parse the PDF structure.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract embedded text.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to decode a page's scan image.
    #[error("failed to extract page image: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Page index out of range (0-based).
    #[error("invalid page index: {0}")]
    InvalidPage(usize),
}

/// Errors reported by OCR backends.
///
/// A single bad page is never an `Err` - backends encode page failures
/// inside their report. These variants cover whole-document and
/// whole-backend failures only.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend cannot run in this environment at all.
    #[error("backend unavailable: {reason}")]
    Unavailable { reason: String },

    /// The document could not be opened for this backend.
    #[error("document error: {0}")]
    Document(#[from] PdfError),

    /// The external OCR process failed for the whole document.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Image encoding error while preparing OCR input.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the mizan library.
pub type Result<T> = std::result::Result<T, MizanError>;
