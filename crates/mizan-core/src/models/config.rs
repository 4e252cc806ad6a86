//! Configuration structures for the evaluation pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the mizan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MizanConfig {
    /// Needs-OCR page classification thresholds.
    pub classifier: ClassifierConfig,

    /// Ranking weights and normalization guards.
    pub scoring: ScoringConfig,

    /// Document-type heuristic settings.
    pub analysis: AnalysisConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// External OCR process configuration.
    pub ocr: OcrConfig,
}

/// Thresholds for the per-page needs-OCR decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum characters (after trimming) for a page to count as having text.
    pub char_threshold: usize,

    /// Minimum ratio of valid-charset characters.
    pub ratio_threshold: f64,

    /// Glyphs that indicate a broken embedded-text layer.
    pub artifact_glyphs: Vec<char>,

    /// Maximum tolerated artifact density before falling back to OCR.
    pub artifact_density_limit: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            char_threshold: 50,
            ratio_threshold: 0.3,
            artifact_glyphs: vec!['\u{FFFD}', '□', '▪', '◦', '●'],
            artifact_density_limit: 0.05,
        }
    }
}

/// Weights and guards for backend ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of normalized confidence in the blended performance score.
    pub accuracy_weight: f64,

    /// Weight of normalized words-per-second in the blended performance score.
    pub speed_weight: f64,

    /// Lower bound applied to divisors (processing time, normalization maxima).
    pub epsilon: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            accuracy_weight: 0.6,
            speed_weight: 0.4,
            epsilon: 1e-3,
        }
    }
}

/// Settings for the legal document-type heuristic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Keyword-hit count that saturates type confidence at 1.0.
    pub type_confidence_divisor: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            type_confidence_divisor: 10.0,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI requested when rasterizing pages for OCR.
    pub render_dpi: u32,

    /// Maximum pages to process per document (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            max_pages: 0,
        }
    }
}

/// External OCR process configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language codes, e.g. "ara+eng".
    pub languages: String,

    /// Tesseract page segmentation mode (6 = uniform block of text).
    pub psm: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: "ara+eng".to_string(),
            psm: 6,
        }
    }
}

impl MizanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
