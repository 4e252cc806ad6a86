//! Smart hybrid backend: direct extraction with per-page OCR fallback.
//!
//! For each page the needs-OCR classifier inspects the embedded text
//! layer. Trustworthy pages use direct extraction; scanned or garbled
//! pages are rasterized and sent through the OCR engine. When the OCR
//! engine is unavailable, or fails on a page, the page falls back to
//! whatever the text layer gave.

use std::path::Path;
use std::time::Instant;

use tempfile::TempDir;
use tracing::{debug, info};

use mizan_core::error::BackendError;
use mizan_core::models::config::ClassifierConfig;
use mizan_core::models::report::{ExtractionReport, ExtractionResult};
use mizan_core::pdf::{PdfExtractor, PdfProcessor};
use mizan_core::text::clean_arabic_text;
use mizan_core::{OcrBackend, PageClassifier};

use crate::direct::resolve_page_indices;
use crate::tesseract::TesseractBackend;

pub(crate) const BACKEND_NAME: &str = "smart";

/// Hybrid extraction backend.
pub struct SmartBackend {
    classifier: PageClassifier,
    ocr: Option<TesseractBackend>,
}

impl SmartBackend {
    pub fn new(classifier_config: ClassifierConfig, ocr: Option<TesseractBackend>) -> Self {
        Self {
            classifier: PageClassifier::new(classifier_config),
            ocr,
        }
    }

    /// Produce one page result, routing through OCR when the embedded
    /// text is untrustworthy.
    fn extract_page(
        &self,
        extractor: &PdfExtractor,
        raw_text: &str,
        index: usize,
        dpi: u32,
        scratch: &Path,
        ocr_pages: &mut usize,
        direct_pages: &mut usize,
    ) -> ExtractionResult {
        let page_start = Instant::now();

        if self.classifier.needs_ocr(raw_text) {
            if let Some(ocr) = &self.ocr {
                let recognized = extractor
                    .render_page(index, dpi)
                    .map_err(BackendError::from)
                    .and_then(|image| ocr.ocr_image(&image, scratch, index));

                match recognized {
                    Ok((text, confidence)) => {
                        debug!(page = index, "smart: OCR");
                        *ocr_pages += 1;
                        return ExtractionResult::page(
                            index,
                            text,
                            confidence,
                            page_start.elapsed().as_secs_f64(),
                            BACKEND_NAME,
                        );
                    }
                    Err(e) => {
                        debug!(page = index, error = %e, "smart: OCR failed, falling back to direct");
                    }
                }
            }
        }

        debug!(page = index, "smart: direct extraction");
        *direct_pages += 1;
        let text = clean_arabic_text(raw_text);
        let confidence = if text.is_empty() { 0.0 } else { 1.0 };
        ExtractionResult::page(
            index,
            text,
            confidence,
            page_start.elapsed().as_secs_f64(),
            BACKEND_NAME,
        )
    }
}

impl OcrBackend for SmartBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn extract(
        &self,
        pdf_path: &Path,
        pages: Option<&[usize]>,
        dpi: u32,
    ) -> Result<ExtractionReport, BackendError> {
        let start = Instant::now();
        let extractor = PdfExtractor::open(pdf_path)?;
        let indices = resolve_page_indices(pages, extractor.page_count());
        let scratch = TempDir::new()?;

        // A broken text layer is not fatal here: pages simply classify
        // as needing OCR.
        let page_texts = extractor.extract_pages_text().unwrap_or_default();

        let mut ocr_pages = 0usize;
        let mut direct_pages = 0usize;
        let mut results = Vec::with_capacity(indices.len());

        for index in indices {
            if index >= extractor.page_count() {
                results.push(ExtractionResult::failed(
                    index,
                    format!("invalid page index: {}", index),
                    0.0,
                    BACKEND_NAME,
                ));
                continue;
            }

            let raw_text = page_texts.get(index).map(String::as_str).unwrap_or("");
            results.push(self.extract_page(
                &extractor,
                raw_text,
                index,
                dpi,
                scratch.path(),
                &mut ocr_pages,
                &mut direct_pages,
            ));
        }

        info!(
            direct_pages,
            ocr_pages,
            "smart extraction complete for {}",
            pdf_path.display()
        );

        Ok(ExtractionReport::from_pages(
            BACKEND_NAME,
            results,
            start.elapsed().as_secs_f64(),
        ))
    }
}
