//! Per-page needs-OCR classification.
//!
//! Decides, from a page's embedded text layer, whether the text is
//! trustworthy or the page must be rasterized and OCR'd. Every check
//! short-circuits toward OCR: a false positive costs one OCR pass, a
//! false negative silently drops page content.

use tracing::debug;

use crate::models::config::ClassifierConfig;
use crate::patterns::VALID_TEXT_CHAR;

/// Needs-OCR page classifier.
#[derive(Debug, Clone)]
pub struct PageClassifier {
    config: ClassifierConfig,
}

impl PageClassifier {
    /// Create a classifier with the given thresholds.
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Decide whether a page needs OCR based on its embedded text.
    ///
    /// Returns `true` (needs OCR) when the text is missing, too short,
    /// dominated by out-of-charset characters, or peppered with
    /// extraction artifacts. Degenerate statistics also resolve to
    /// `true` rather than skipping the page.
    pub fn needs_ocr(&self, raw_text: &str) -> bool {
        let trimmed = raw_text.trim();
        let total_chars = trimmed.chars().count();

        if total_chars < self.config.char_threshold {
            debug!(total_chars, "page below character threshold, using OCR");
            return true;
        }
        if total_chars == 0 {
            return true;
        }

        let valid_chars = VALID_TEXT_CHAR.find_iter(trimmed).count();
        let valid_ratio = valid_chars as f64 / total_chars as f64;
        if valid_ratio < self.config.ratio_threshold {
            debug!(valid_ratio, "page text mostly out of charset, using OCR");
            return true;
        }

        let artifact_count: usize = self
            .config
            .artifact_glyphs
            .iter()
            .map(|glyph| trimmed.matches(*glyph).count())
            .sum();
        let artifact_density = artifact_count as f64 / total_chars as f64;
        if artifact_density > self.config.artifact_density_limit {
            debug!(artifact_density, "page text has extraction artifacts, using OCR");
            return true;
        }

        false
    }
}

impl Default for PageClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> PageClassifier {
        PageClassifier::default()
    }

    fn arabic_paragraph() -> String {
        // Clean legal boilerplate, comfortably past the character threshold.
        "المادة الاولى: يهدف هذا النظام الى تنظيم قواعد الاثبات في المعاملات المدنية والتجارية وتحديد اجراءات تقديم الادلة امام المحاكم المختصة."
            .to_string()
    }

    #[test]
    fn test_empty_text_needs_ocr() {
        assert!(classifier().needs_ocr(""));
        assert!(classifier().needs_ocr("   \n  "));
    }

    #[test]
    fn test_short_text_needs_ocr() {
        assert!(classifier().needs_ocr("نظام قصير"));
    }

    #[test]
    fn test_clean_arabic_text_skips_ocr() {
        assert!(!classifier().needs_ocr(&arabic_paragraph()));
    }

    #[test]
    fn test_clean_ascii_text_skips_ocr() {
        let text = "This page was digitally authored and its embedded text layer is perfectly usable, with more than enough characters.";
        assert!(!classifier().needs_ocr(text));
    }

    #[test]
    fn test_garbled_text_needs_ocr() {
        // Long enough, but dominated by characters outside the allowed set.
        let garbled: String = "▯▯◆◆▯☰☱☲☳☴☵☶☷".repeat(10);
        assert!(classifier().needs_ocr(&garbled));
    }

    #[test]
    fn test_artifact_density_needs_ocr() {
        // Valid base text with >5% replacement characters sprinkled in.
        let mut text = arabic_paragraph();
        let artifacts = "�".repeat(text.chars().count() / 10);
        text.push_str(&artifacts);
        assert!(classifier().needs_ocr(&text));
    }

    #[test]
    fn test_threshold_boundary() {
        let config = ClassifierConfig {
            char_threshold: 10,
            ..ClassifierConfig::default()
        };
        let classifier = PageClassifier::new(config);

        assert!(classifier.needs_ocr("abcdefghi")); // 9 chars
        assert!(!classifier.needs_ocr("abcdefghij")); // 10 chars
    }
}
