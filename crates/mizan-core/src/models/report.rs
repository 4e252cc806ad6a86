//! Result and report types produced by the extraction and comparison pipeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{DocumentAnalysis, DocumentType};
use crate::text::word_count;

/// Extraction outcome for a single (page, backend) pair. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// 0-based page index within the source document.
    pub page_index: usize,

    /// Cleaned extracted text (empty on failure).
    pub text: String,

    /// Whitespace-delimited token count of `text`.
    pub word_count: usize,

    /// Backend-reported confidence in [0, 1]. Zero when `error` is set.
    pub confidence: f64,

    /// Seconds spent on this page.
    pub processing_time: f64,

    /// Name of the backend that produced this result.
    pub backend_name: String,

    /// Whether `text` is non-empty after cleaning.
    pub has_content: bool,

    /// Page-level failure reason, if extraction failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    /// Build a successful page result from cleaned text.
    pub fn page(
        page_index: usize,
        text: String,
        confidence: f64,
        processing_time: f64,
        backend_name: &str,
    ) -> Self {
        let words = word_count(&text);
        let has_content = !text.trim().is_empty();
        Self {
            page_index,
            text,
            word_count: words,
            confidence: confidence.clamp(0.0, 1.0),
            processing_time,
            backend_name: backend_name.to_string(),
            has_content,
            error: None,
        }
    }

    /// Build a failed page result. Confidence is pinned to zero.
    pub fn failed(
        page_index: usize,
        error: impl Into<String>,
        processing_time: f64,
        backend_name: &str,
    ) -> Self {
        Self {
            page_index,
            text: String::new(),
            word_count: 0,
            confidence: 0.0,
            processing_time,
            backend_name: backend_name.to_string(),
            has_content: false,
            error: Some(error.into()),
        }
    }
}

/// Raw output of one backend run over a document, before document analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Backend that produced this report.
    pub backend_name: String,

    /// Per-page results in ascending page-index order.
    pub page_results: Vec<ExtractionResult>,

    /// Non-empty page texts joined with a blank line, in page order.
    pub full_text: String,

    /// Number of pages attempted.
    pub total_pages: usize,

    /// Token count of `full_text`.
    pub total_words: usize,

    /// Mean page confidence over pages with content.
    pub overall_confidence: f64,

    /// Wall-clock seconds for the whole run.
    pub processing_time: f64,
}

impl ExtractionReport {
    /// Assemble a report from per-page results.
    ///
    /// Pages are re-sorted to ascending page index regardless of the order
    /// they were produced or collected in.
    pub fn from_pages(
        backend_name: &str,
        mut page_results: Vec<ExtractionResult>,
        processing_time: f64,
    ) -> Self {
        page_results.sort_by_key(|p| p.page_index);
        let full_text = join_page_texts(&page_results);
        let total_words = word_count(&full_text);
        let overall_confidence = mean_page_confidence(&page_results);
        Self {
            backend_name: backend_name.to_string(),
            total_pages: page_results.len(),
            page_results,
            full_text,
            total_words,
            overall_confidence,
            processing_time,
        }
    }
}

/// Join page texts with a blank-line separator, skipping pages without
/// content. Expects pages already sorted by page index.
pub(crate) fn join_page_texts(pages: &[ExtractionResult]) -> String {
    pages
        .iter()
        .filter(|p| p.has_content)
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Mean confidence over pages with content; 0.0 when no page has any.
pub(crate) fn mean_page_confidence(pages: &[ExtractionResult]) -> f64 {
    let with_content: Vec<f64> = pages
        .iter()
        .filter(|p| p.has_content)
        .map(|p| p.confidence)
        .collect();
    if with_content.is_empty() {
        0.0
    } else {
        with_content.iter().sum::<f64>() / with_content.len() as f64
    }
}

/// Whole-document result for one backend, including document analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Backend that produced this result.
    pub backend_name: String,

    /// Per-page results in ascending page-index order. Pages without
    /// content stay here for auditing with `has_content = false`.
    pub pages: Vec<ExtractionResult>,

    /// Non-empty page texts joined with a blank line, in page order.
    pub full_text: String,

    /// Number of pages attempted.
    pub total_pages: usize,

    /// Token count of `full_text`.
    pub total_words: usize,

    /// Character count of `full_text`.
    pub total_characters: usize,

    /// Mean page confidence over pages with content.
    pub overall_confidence: f64,

    /// Wall-clock seconds for the whole run.
    pub processing_time: f64,

    /// Detected legal document category.
    pub document_type: DocumentType,

    /// Saturating keyword-count confidence in [0, 1].
    pub type_confidence: f64,

    /// Category keywords actually present in the text.
    pub legal_terms_found: Vec<String>,

    /// Number of statutory article references found.
    pub article_count: usize,

    /// Whether the text contains any date-like pattern.
    pub contains_dates: bool,
}

impl DocumentResult {
    /// Combine an extraction report with document analysis.
    pub fn new(report: ExtractionReport, analysis: DocumentAnalysis) -> Self {
        Self {
            backend_name: report.backend_name,
            total_characters: report.full_text.chars().count(),
            pages: report.page_results,
            full_text: report.full_text,
            total_pages: report.total_pages,
            total_words: report.total_words,
            overall_confidence: report.overall_confidence,
            processing_time: report.processing_time,
            document_type: analysis.document_type,
            type_confidence: analysis.type_confidence,
            legal_terms_found: analysis.legal_terms_found,
            article_count: analysis.article_count,
            contains_dates: analysis.contains_dates,
        }
    }
}

/// Per-backend comparison entry: a document result or a failure reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackendOutcome {
    /// The backend produced a document result.
    Success(Box<DocumentResult>),

    /// The backend failed at the document or engine level.
    Failed { error: String },
}

impl BackendOutcome {
    /// The document result, if this outcome is a success.
    pub fn result(&self) -> Option<&DocumentResult> {
        match self {
            Self::Success(result) => Some(result),
            Self::Failed { .. } => None,
        }
    }

    /// The failure reason, if this outcome is a failure.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failed { error } => Some(error),
        }
    }
}

/// Which pages a comparison covered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PagesProcessed {
    /// An explicit ordered page-index subset.
    Selected(Vec<usize>),

    /// Every page of the document (serialized as the string "all").
    All(String),
}

impl PagesProcessed {
    pub fn all() -> Self {
        Self::All("all".to_string())
    }

    pub fn from_selection(pages: Option<&[usize]>) -> Self {
        match pages {
            Some(indices) => Self::Selected(indices.to_vec()),
            None => Self::all(),
        }
    }
}

/// Metadata describing one comparison invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonMetadata {
    pub pdf_path: String,
    pub pages_processed: PagesProcessed,
    pub backends_compared: Vec<String>,
    pub total_comparison_time: f64,
    pub parallel_execution: bool,
    pub timestamp: DateTime<Utc>,
}

/// One row of the blended performance ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceRankEntry {
    pub rank: usize,
    pub backend: String,
    pub performance_score: f64,
    pub confidence: f64,
    pub speed: f64,
}

/// One row of the accuracy ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyRankEntry {
    pub rank: usize,
    pub backend: String,
    pub confidence: f64,
    pub total_words: usize,
}

/// One row of the speed ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedRankEntry {
    pub rank: usize,
    pub backend: String,
    pub words_per_second: f64,
    pub processing_time: f64,
}

/// Aggregate statistics over successful backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonStatistics {
    pub total_backends_tested: usize,
    pub avg_confidence: f64,
    pub avg_processing_time: f64,
    pub avg_words_extracted: f64,
    pub best_accuracy: Option<String>,
    pub fastest_backend: Option<String>,
    pub best_overall: Option<String>,
}

/// Ranked summary of a comparison run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub performance_ranking: Vec<PerformanceRankEntry>,
    pub accuracy_ranking: Vec<AccuracyRankEntry>,
    pub speed_ranking: Vec<SpeedRankEntry>,
    pub statistics: ComparisonStatistics,
}

/// Complete output of one comparison invocation. Read-only after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub comparison_metadata: ComparisonMetadata,

    /// Keyed by backend name; failed backends keep an error entry here
    /// even though they are excluded from every ranking.
    pub individual_results: BTreeMap<String, BackendOutcome>,

    pub comparison_summary: ComparisonSummary,
}
