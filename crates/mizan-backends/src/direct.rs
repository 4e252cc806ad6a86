//! Direct embedded-text extraction backend.
//!
//! No OCR at all: reads the text layer the PDF already carries. On
//! digitally-authored documents this is both the fastest and the most
//! accurate option; on scanned documents it extracts nothing.

use std::path::Path;
use std::time::Instant;

use tracing::debug;

use mizan_core::error::BackendError;
use mizan_core::models::report::{ExtractionReport, ExtractionResult};
use mizan_core::pdf::{PdfExtractor, PdfProcessor};
use mizan_core::text::clean_arabic_text;
use mizan_core::OcrBackend;

pub(crate) const BACKEND_NAME: &str = "direct";

/// Embedded text layer backend.
#[derive(Debug, Clone, Default)]
pub struct DirectTextBackend;

impl DirectTextBackend {
    pub fn new() -> Self {
        Self
    }
}

impl OcrBackend for DirectTextBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn extract(
        &self,
        pdf_path: &Path,
        pages: Option<&[usize]>,
        _dpi: u32,
    ) -> Result<ExtractionReport, BackendError> {
        let start = Instant::now();
        let extractor = PdfExtractor::open(pdf_path)?;
        let indices = resolve_page_indices(pages, extractor.page_count());

        // Whole-document text extraction; a failure here takes out every
        // requested page but still yields a report, per the contract.
        let page_texts = match extractor.extract_pages_text() {
            Ok(texts) => texts,
            Err(e) => {
                let reason = e.to_string();
                debug!(error = %reason, "embedded text extraction failed");
                let elapsed = start.elapsed().as_secs_f64();
                let per_page = elapsed / indices.len().max(1) as f64;
                let results = indices
                    .iter()
                    .map(|&i| ExtractionResult::failed(i, reason.clone(), per_page, BACKEND_NAME))
                    .collect();
                return Ok(ExtractionReport::from_pages(BACKEND_NAME, results, elapsed));
            }
        };

        let mut results = Vec::with_capacity(indices.len());
        for index in indices {
            let page_start = Instant::now();
            let result = match page_texts.get(index) {
                Some(raw) => {
                    let text = clean_arabic_text(raw);
                    let confidence = if text.is_empty() { 0.0 } else { 1.0 };
                    ExtractionResult::page(
                        index,
                        text,
                        confidence,
                        page_start.elapsed().as_secs_f64(),
                        BACKEND_NAME,
                    )
                }
                None => ExtractionResult::failed(
                    index,
                    format!("invalid page index: {}", index),
                    page_start.elapsed().as_secs_f64(),
                    BACKEND_NAME,
                ),
            };
            results.push(result);
        }

        Ok(ExtractionReport::from_pages(
            BACKEND_NAME,
            results,
            start.elapsed().as_secs_f64(),
        ))
    }
}

/// Resolve the requested page set against the document's page count.
/// Requested indices are kept even when out of range so they can be
/// reported as per-page failures.
pub(crate) fn resolve_page_indices(pages: Option<&[usize]>, page_count: usize) -> Vec<usize> {
    match pages {
        Some(requested) => requested.to_vec(),
        None => (0..page_count).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_all_pages() {
        assert_eq!(resolve_page_indices(None, 3), vec![0, 1, 2]);
        assert_eq!(resolve_page_indices(None, 0), Vec::<usize>::new());
    }

    #[test]
    fn test_resolve_explicit_pages_keeps_out_of_range() {
        assert_eq!(resolve_page_indices(Some(&[0, 5]), 3), vec![0, 5]);
    }

    #[test]
    fn test_missing_document_is_document_error() {
        let backend = DirectTextBackend::new();
        let err = backend
            .extract(Path::new("/no/such.pdf"), None, 300)
            .unwrap_err();
        assert!(matches!(err, BackendError::Document(_)));
    }
}
