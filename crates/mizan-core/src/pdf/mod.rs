//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
///
/// Page indices are 0-based throughout. A failure on one page must
/// surface as that page's error, never as a document-level abort.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Number of pages in the loaded document.
    fn page_count(&self) -> usize;

    /// Extract the embedded text of every page, in page order.
    fn extract_pages_text(&self) -> Result<Vec<String>>;

    /// Extract the embedded text of a single page.
    fn extract_page_text(&self, index: usize) -> Result<String>;

    /// Produce the rasterized image of a page at the requested DPI.
    fn render_page(&self, index: usize, dpi: u32) -> Result<DynamicImage>;
}
