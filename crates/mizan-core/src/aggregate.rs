//! Merging per-page results into whole-document results.

use tracing::debug;

use crate::analysis::DocumentClassifier;
use crate::models::config::AnalysisConfig;
use crate::models::report::{DocumentResult, ExtractionReport, ExtractionResult};

/// Merges per-page extraction results into a document result and runs
/// the document-type heuristic over the combined text.
#[derive(Debug, Clone)]
pub struct DocumentAggregator {
    classifier: DocumentClassifier,
}

impl DocumentAggregator {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            classifier: DocumentClassifier::new(config),
        }
    }

    /// Aggregate loose page results collected in any order.
    ///
    /// Pages are re-sorted to ascending page index before the text join,
    /// so collection order (e.g. parallel completion order) never leaks
    /// into `full_text`.
    pub fn aggregate(
        &self,
        backend_name: &str,
        pages: Vec<ExtractionResult>,
        processing_time: f64,
    ) -> DocumentResult {
        let report = ExtractionReport::from_pages(backend_name, pages, processing_time);
        self.aggregate_report(report)
    }

    /// Attach document analysis to an already-assembled report.
    pub fn aggregate_report(&self, report: ExtractionReport) -> DocumentResult {
        let analysis = self.classifier.analyze(&report.full_text);
        debug!(
            backend = %report.backend_name,
            pages = report.total_pages,
            words = report.total_words,
            document_type = %analysis.document_type,
            "aggregated document result"
        );
        DocumentResult::new(report, analysis)
    }
}

impl Default for DocumentAggregator {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
