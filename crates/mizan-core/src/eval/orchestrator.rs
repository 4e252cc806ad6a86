//! Running a backend set over one document and collecting outcomes.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::aggregate::DocumentAggregator;
use crate::backend::{BackendRegistry, OcrBackend};
use crate::error::{MizanError, PdfError, Result};
use crate::models::config::MizanConfig;
use crate::models::report::{
    BackendOutcome, ComparisonMetadata, ComparisonReport, PagesProcessed,
};

use super::ScoringEngine;

/// Runs one or more backends over a document, isolating per-backend
/// failures, and assembles the ranked comparison report.
///
/// Expected failures never surface as `Err`: a backend that cannot
/// process the document becomes an error entry in `individual_results`
/// and is excluded from the rankings. Once a backend starts it runs to
/// its own completion - there is no cancellation or per-backend
/// deadline in this design.
pub struct ComparisonOrchestrator {
    aggregator: DocumentAggregator,
    scorer: ScoringEngine,
    dpi: u32,
}

impl ComparisonOrchestrator {
    pub fn new(config: &MizanConfig) -> Self {
        Self {
            aggregator: DocumentAggregator::new(config.analysis.clone()),
            scorer: ScoringEngine::new(config.scoring.clone()),
            dpi: config.pdf.render_dpi,
        }
    }

    /// Compare backends on one document.
    ///
    /// `backends = None` selects every available backend; `pages = None`
    /// selects every page. In parallel mode each backend runs on its own
    /// thread; a failure (or panic) in one never perturbs the results of
    /// its siblings. The result map is keyed by backend name, so
    /// completion order does not affect the report.
    pub fn compare(
        &self,
        registry: &BackendRegistry,
        pdf_path: &Path,
        pages: Option<&[usize]>,
        backends: Option<&[String]>,
        parallel: bool,
    ) -> Result<ComparisonReport> {
        if !pdf_path.exists() {
            return Err(MizanError::Pdf(PdfError::Open {
                path: pdf_path.display().to_string(),
                reason: "file not found".to_string(),
            }));
        }

        let selected = registry.select(backends);
        if selected.is_empty() {
            return Err(MizanError::NoBackends);
        }

        let backend_names: Vec<String> =
            selected.iter().map(|b| b.name().to_string()).collect();
        info!(
            backends = ?backend_names,
            parallel,
            "comparing {} backends on {}",
            selected.len(),
            pdf_path.display()
        );

        let start = Instant::now();
        let individual_results = if parallel && selected.len() > 1 {
            self.run_parallel(&selected, pdf_path, pages)
        } else {
            self.run_sequential(&selected, pdf_path, pages)
        };
        let total_comparison_time = start.elapsed().as_secs_f64();

        let comparison_summary = self.scorer.summarize(&individual_results);

        Ok(ComparisonReport {
            comparison_metadata: ComparisonMetadata {
                pdf_path: pdf_path.display().to_string(),
                pages_processed: PagesProcessed::from_selection(pages),
                backends_compared: backend_names,
                total_comparison_time,
                parallel_execution: parallel,
                timestamp: Utc::now(),
            },
            individual_results,
            comparison_summary,
        })
    }

    fn run_sequential(
        &self,
        backends: &[Arc<dyn OcrBackend>],
        pdf_path: &Path,
        pages: Option<&[usize]>,
    ) -> BTreeMap<String, BackendOutcome> {
        backends
            .iter()
            .map(|backend| {
                (
                    backend.name().to_string(),
                    self.run_backend(backend.as_ref(), pdf_path, pages),
                )
            })
            .collect()
    }

    fn run_parallel(
        &self,
        backends: &[Arc<dyn OcrBackend>],
        pdf_path: &Path,
        pages: Option<&[usize]>,
    ) -> BTreeMap<String, BackendOutcome> {
        thread::scope(|scope| {
            let handles: Vec<_> = backends
                .iter()
                .map(|backend| {
                    let name = backend.name().to_string();
                    let handle = scope
                        .spawn(move || self.run_backend(backend.as_ref(), pdf_path, pages));
                    (name, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(name, handle)| {
                    let outcome = handle.join().unwrap_or_else(|_| {
                        warn!(backend = %name, "backend task panicked");
                        BackendOutcome::Failed {
                            error: "backend task panicked".to_string(),
                        }
                    });
                    (name, outcome)
                })
                .collect()
        })
    }

    fn run_backend(
        &self,
        backend: &dyn OcrBackend,
        pdf_path: &Path,
        pages: Option<&[usize]>,
    ) -> BackendOutcome {
        let start = Instant::now();
        debug!(backend = backend.name(), "starting extraction");

        match backend.extract(pdf_path, pages, self.dpi) {
            Ok(report) => {
                debug!(
                    backend = backend.name(),
                    words = report.total_words,
                    elapsed = ?start.elapsed(),
                    "extraction complete"
                );
                BackendOutcome::Success(Box::new(self.aggregator.aggregate_report(report)))
            }
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "backend failed");
                BackendOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

impl Default for ComparisonOrchestrator {
    fn default() -> Self {
        Self::new(&MizanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::models::report::{ExtractionReport, ExtractionResult};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    /// Deterministic fake backend: fixed confidence and word rate.
    struct FixedBackend {
        name: String,
        confidence: f64,
        words_per_page: usize,
        processing_time: f64,
    }

    impl OcrBackend for FixedBackend {
        fn name(&self) -> &str {
            &self.name
        }

        fn extract(
            &self,
            _pdf_path: &Path,
            pages: Option<&[usize]>,
            _dpi: u32,
        ) -> std::result::Result<ExtractionReport, BackendError> {
            let indices: Vec<usize> = pages.map(|p| p.to_vec()).unwrap_or_else(|| vec![0, 1]);
            let results = indices
                .iter()
                .map(|&i| {
                    let text = vec!["كلمة"; self.words_per_page].join(" ");
                    ExtractionResult::page(i, text, self.confidence, 0.1, &self.name)
                })
                .collect();
            Ok(ExtractionReport::from_pages(
                &self.name,
                results,
                self.processing_time,
            ))
        }
    }

    /// A backend that always fails at the document level.
    struct BrokenBackend;

    impl OcrBackend for BrokenBackend {
        fn name(&self) -> &str {
            "broken"
        }

        fn extract(
            &self,
            _pdf_path: &Path,
            _pages: Option<&[usize]>,
            _dpi: u32,
        ) -> std::result::Result<ExtractionReport, BackendError> {
            Err(BackendError::Extraction("engine exploded".to_string()))
        }
    }

    /// A backend whose task panics outright.
    struct PanickingBackend;

    impl OcrBackend for PanickingBackend {
        fn name(&self) -> &str {
            "panicky"
        }

        fn extract(
            &self,
            _pdf_path: &Path,
            _pages: Option<&[usize]>,
            _dpi: u32,
        ) -> std::result::Result<ExtractionReport, BackendError> {
            panic!("unexpected engine bug");
        }
    }

    fn fixed(name: &str, confidence: f64, words: usize, time: f64) -> Arc<dyn OcrBackend> {
        Arc::new(FixedBackend {
            name: name.to_string(),
            confidence,
            words_per_page: words,
            processing_time: time,
        })
    }

    fn two_backend_registry() -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        registry.register(fixed("fast", 0.6, 100, 1.0));
        registry.register(fixed("accurate", 0.95, 40, 4.0));
        registry
    }

    fn temp_pdf() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4 placeholder").unwrap();
        file
    }

    #[test]
    fn test_missing_document_is_an_error() {
        let registry = two_backend_registry();
        let err = ComparisonOrchestrator::default()
            .compare(&registry, Path::new("/no/such.pdf"), None, None, false)
            .unwrap_err();
        assert!(matches!(err, MizanError::Pdf(PdfError::Open { .. })));
    }

    #[test]
    fn test_empty_backend_set_is_an_error() {
        let registry = BackendRegistry::new();
        let file = temp_pdf();
        let err = ComparisonOrchestrator::default()
            .compare(&registry, file.path(), None, None, false)
            .unwrap_err();
        assert!(matches!(err, MizanError::NoBackends));
    }

    #[test]
    fn test_sequential_compare_ranks_backends() {
        let registry = two_backend_registry();
        let file = temp_pdf();

        let report = ComparisonOrchestrator::default()
            .compare(&registry, file.path(), Some(&[0, 1, 2]), None, false)
            .unwrap();

        assert_eq!(report.individual_results.len(), 2);
        let summary = &report.comparison_summary;
        assert_eq!(summary.accuracy_ranking[0].backend, "accurate");
        assert_eq!(summary.speed_ranking[0].backend, "fast");
        assert_eq!(summary.statistics.total_backends_tested, 2);
        assert!(!report.comparison_metadata.parallel_execution);
    }

    #[test]
    fn test_failed_backend_is_reported_but_not_ranked() {
        let mut registry = two_backend_registry();
        registry.register(Arc::new(BrokenBackend));
        let file = temp_pdf();

        let report = ComparisonOrchestrator::default()
            .compare(&registry, file.path(), None, None, false)
            .unwrap();

        assert_eq!(report.individual_results.len(), 3);
        let broken = &report.individual_results["broken"];
        assert!(broken.error().unwrap().contains("engine exploded"));
        assert_eq!(report.comparison_summary.accuracy_ranking.len(), 2);
    }

    #[test]
    fn test_failure_isolation_in_parallel_mode() {
        let file = temp_pdf();
        let orchestrator = ComparisonOrchestrator::default();

        let clean = orchestrator
            .compare(&two_backend_registry(), file.path(), None, None, true)
            .unwrap();

        let mut with_broken_registry = two_backend_registry();
        with_broken_registry.register(Arc::new(PanickingBackend));
        let with_broken = orchestrator
            .compare(&with_broken_registry, file.path(), None, None, true)
            .unwrap();

        // The panicking sibling is tagged, and the survivors' rankings
        // are byte-for-byte what they were without it.
        assert!(with_broken.individual_results["panicky"].error().is_some());
        assert_eq!(
            serde_json::to_value(&clean.comparison_summary.accuracy_ranking).unwrap(),
            serde_json::to_value(&with_broken.comparison_summary.accuracy_ranking).unwrap()
        );
        assert_eq!(
            serde_json::to_value(&clean.comparison_summary.speed_ranking).unwrap(),
            serde_json::to_value(&with_broken.comparison_summary.speed_ranking).unwrap()
        );
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let file = temp_pdf();
        let orchestrator = ComparisonOrchestrator::default();
        let registry = two_backend_registry();

        let sequential = orchestrator
            .compare(&registry, file.path(), Some(&[0]), None, false)
            .unwrap();
        let parallel = orchestrator
            .compare(&registry, file.path(), Some(&[0]), None, true)
            .unwrap();

        assert_eq!(
            serde_json::to_value(&sequential.comparison_summary).unwrap(),
            serde_json::to_value(&parallel.comparison_summary).unwrap()
        );
    }

    #[test]
    fn test_compare_is_reproducible() {
        let file = temp_pdf();
        let orchestrator = ComparisonOrchestrator::default();
        let registry = two_backend_registry();

        let first = orchestrator
            .compare(&registry, file.path(), None, None, true)
            .unwrap();
        let second = orchestrator
            .compare(&registry, file.path(), None, None, true)
            .unwrap();

        assert_eq!(
            serde_json::to_value(&first.comparison_summary.statistics).unwrap(),
            serde_json::to_value(&second.comparison_summary.statistics).unwrap()
        );
    }

    #[test]
    fn test_backend_subset_selection() {
        let file = temp_pdf();
        let registry = two_backend_registry();

        let report = ComparisonOrchestrator::default()
            .compare(
                &registry,
                file.path(),
                None,
                Some(&["fast".to_string()]),
                false,
            )
            .unwrap();

        assert_eq!(report.individual_results.len(), 1);
        assert!(report.individual_results.contains_key("fast"));
        assert_eq!(report.comparison_metadata.backends_compared, vec!["fast"]);
    }

    #[test]
    fn test_report_json_shape() {
        let file = temp_pdf();
        let report = ComparisonOrchestrator::default()
            .compare(&two_backend_registry(), file.path(), Some(&[0]), None, true)
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["comparison_metadata"]["pdf_path"].is_string());
        assert_eq!(json["comparison_metadata"]["pages_processed"], serde_json::json!([0]));
        assert_eq!(json["comparison_metadata"]["parallel_execution"], true);
        assert!(json["individual_results"]["fast"]["full_text"].is_string());
        assert!(json["comparison_summary"]["performance_ranking"].is_array());
        assert!(json["comparison_summary"]["accuracy_ranking"][0]["confidence"].is_number());
        assert!(json["comparison_summary"]["statistics"]["best_overall"].is_string());
    }
}
