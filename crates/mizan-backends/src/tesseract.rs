//! System Tesseract backend.
//!
//! Rasterizes each page through the core extractor, writes it to a
//! scratch PNG, and runs the `tesseract` binary in TSV mode to get
//! per-word confidence scores alongside the recognized text.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use image::DynamicImage;
use tempfile::TempDir;
use tracing::{debug, warn};

use mizan_core::error::BackendError;
use mizan_core::models::config::OcrConfig;
use mizan_core::models::report::{ExtractionReport, ExtractionResult};
use mizan_core::pdf::{PdfExtractor, PdfProcessor};
use mizan_core::text::clean_arabic_text;
use mizan_core::OcrBackend;

use crate::direct::resolve_page_indices;

pub(crate) const BACKEND_NAME: &str = "tesseract";

/// Tesseract OCR backend driving the system binary.
#[derive(Debug, Clone)]
pub struct TesseractBackend {
    languages: String,
    psm: u32,
}

impl TesseractBackend {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            languages: config.languages.clone(),
            psm: config.psm,
        }
    }

    /// Check whether the tesseract binary can be found on PATH.
    pub fn probe() -> Result<(), BackendError> {
        which::which("tesseract").map_err(|_| BackendError::Unavailable {
            reason: "tesseract binary not found on PATH (install tesseract-ocr with Arabic language data)"
                .to_string(),
        })?;
        Ok(())
    }

    /// OCR a single rendered page.
    ///
    /// Returns the cleaned recognized text and the mean word confidence
    /// in [0, 1].
    pub(crate) fn ocr_image(
        &self,
        image: &DynamicImage,
        scratch: &Path,
        page_index: usize,
    ) -> Result<(String, f64), BackendError> {
        let image_path = scratch.join(format!("page-{}.png", page_index));
        image.save_with_format(&image_path, image::ImageFormat::Png)?;

        let output = Command::new("tesseract")
            .arg(&image_path)
            .arg("stdout")
            .args(["-l", &self.languages])
            .args(["--psm", &self.psm.to_string()])
            .arg("tsv")
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => BackendError::Unavailable {
                    reason: "tesseract binary disappeared from PATH".to_string(),
                },
                _ => BackendError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::Extraction(format!(
                "tesseract failed on page {}: {}",
                page_index,
                stderr.trim()
            )));
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        Ok(parse_tsv(&tsv))
    }
}

impl OcrBackend for TesseractBackend {
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

        let mut results = Vec::with_capacity(indices.len());
        for index in indices {
            let page_start = Instant::now();
            let result = extractor
                .render_page(index, dpi)
                .map_err(BackendError::from)
                .and_then(|image| self.ocr_image(&image, scratch.path(), index));

            let elapsed = page_start.elapsed().as_secs_f64();
            let page_result = match result {
                Ok((text, confidence)) => {
                    debug!(
                        page = index,
                        words = text.split_whitespace().count(),
                        confidence,
                        "page OCR complete"
                    );
                    ExtractionResult::page(index, text, confidence, elapsed, BACKEND_NAME)
                }
                Err(e) => {
                    warn!(page = index, error = %e, "page OCR failed");
                    ExtractionResult::failed(index, e.to_string(), elapsed, BACKEND_NAME)
                }
            };
            results.push(page_result);
        }

        Ok(ExtractionReport::from_pages(
            BACKEND_NAME,
            results,
            start.elapsed().as_secs_f64(),
        ))
    }
}

/// Parse Tesseract TSV output into recognized text and mean word
/// confidence.
///
/// Word rows are level 5; rows with a negative confidence are layout
/// markers and are skipped. Line breaks follow the (block, paragraph,
/// line) grouping.
fn parse_tsv(tsv: &str) -> (String, f64) {
    let mut text = String::new();
    let mut confidences: Vec<f64> = Vec::new();
    let mut current_line: Option<(u32, u32, u32)> = None;

    for row in tsv.lines().skip(1) {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() != 12 {
            continue;
        }

        let level: u32 = fields[0].parse().unwrap_or(0);
        if level != 5 {
            continue;
        }

        let confidence: f64 = fields[10].parse().unwrap_or(-1.0);
        let word = fields[11].trim();
        if confidence < 0.0 || word.is_empty() {
            continue;
        }

        let line_key = (
            fields[2].parse().unwrap_or(0),
            fields[3].parse().unwrap_or(0),
            fields[4].parse().unwrap_or(0),
        );
        match current_line {
            Some(previous) if previous == line_key => text.push(' '),
            Some(_) => text.push('\n'),
            None => {}
        }
        current_line = Some(line_key);

        text.push_str(word);
        confidences.push(confidence / 100.0);
    }

    let mean_confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    (clean_arabic_text(&text), mean_confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn word_row(block: u32, line: u32, word: u32, conf: f64, text: &str) -> String {
        format!("5\t1\t{block}\t1\t{line}\t{word}\t0\t0\t10\t10\t{conf}\t{text}")
    }

    #[test]
    fn test_parse_tsv_words_and_confidence() {
        let tsv = [
            HEADER.to_string(),
            "1\t1\t0\t0\t0\t0\t0\t0\t100\t100\t-1\t".to_string(),
            word_row(1, 1, 1, 90.0, "نظام"),
            word_row(1, 1, 2, 70.0, "الإثبات"),
        ]
        .join("\n");

        let (text, confidence) = parse_tsv(&tsv);
        // Alef-hamza is normalized away by the cleaning pass.
        assert_eq!(text, "نظام الاثبات");
        assert!((confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_parse_tsv_groups_lines() {
        let tsv = [
            HEADER.to_string(),
            word_row(1, 1, 1, 95.0, "first"),
            word_row(1, 1, 2, 95.0, "line"),
            word_row(1, 2, 1, 95.0, "second"),
        ]
        .join("\n");

        let (text, _) = parse_tsv(&tsv);
        assert_eq!(text, "first line second");
    }

    #[test]
    fn test_parse_tsv_skips_negative_confidence_rows() {
        let tsv = [
            HEADER.to_string(),
            word_row(1, 1, 1, -1.0, "ghost"),
            word_row(1, 1, 2, 50.0, "real"),
        ]
        .join("\n");

        let (text, confidence) = parse_tsv(&tsv);
        assert_eq!(text, "real");
        assert!((confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_tsv_empty_output() {
        let (text, confidence) = parse_tsv(HEADER);
        assert_eq!(text, "");
        assert_eq!(confidence, 0.0);
    }
}
