//! Normalizing and ranking backend results.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::config::ScoringConfig;
use crate::models::report::{
    AccuracyRankEntry, BackendOutcome, ComparisonStatistics, ComparisonSummary,
    PerformanceRankEntry, SpeedRankEntry,
};

/// Metrics extracted from one successful backend result.
#[derive(Debug, Clone)]
struct BackendMetrics {
    name: String,
    total_words: usize,
    confidence: f64,
    processing_time: f64,
    words_per_second: f64,
}

/// Ranks backends by accuracy, speed, and a blended performance score.
///
/// All orderings are deterministic: metric descending, then backend
/// name ascending on exact equality. Backends present only as errors
/// never enter any ranking.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Build the ranked summary for a comparison result set.
    pub fn summarize(&self, results: &BTreeMap<String, BackendOutcome>) -> ComparisonSummary {
        let epsilon = self.config.epsilon;

        let metrics: Vec<BackendMetrics> = results
            .iter()
            .filter_map(|(name, outcome)| outcome.result().map(|r| (name, r)))
            .map(|(name, result)| BackendMetrics {
                name: name.clone(),
                total_words: result.total_words,
                confidence: result.overall_confidence,
                processing_time: result.processing_time,
                words_per_second: result.total_words as f64 / result.processing_time.max(epsilon),
            })
            .collect();

        if metrics.is_empty() {
            debug!("no successful backends to rank");
            return ComparisonSummary::default();
        }

        let accuracy = ranked(&metrics, |m| m.confidence);
        let speed = ranked(&metrics, |m| m.words_per_second);

        let max_confidence = max_metric(&metrics, |m| m.confidence).max(epsilon);
        let max_speed = max_metric(&metrics, |m| m.words_per_second).max(epsilon);
        let score = |m: &BackendMetrics| {
            self.config.accuracy_weight * (m.confidence / max_confidence)
                + self.config.speed_weight * (m.words_per_second / max_speed)
        };
        let performance = ranked(&metrics, score);

        let count = metrics.len() as f64;
        let statistics = ComparisonStatistics {
            total_backends_tested: metrics.len(),
            avg_confidence: metrics.iter().map(|m| m.confidence).sum::<f64>() / count,
            avg_processing_time: metrics.iter().map(|m| m.processing_time).sum::<f64>() / count,
            avg_words_extracted: metrics.iter().map(|m| m.total_words as f64).sum::<f64>() / count,
            best_accuracy: accuracy.first().map(|m| m.name.clone()),
            fastest_backend: speed.first().map(|m| m.name.clone()),
            best_overall: performance.first().map(|m| m.name.clone()),
        };

        ComparisonSummary {
            performance_ranking: performance
                .iter()
                .enumerate()
                .map(|(i, m)| PerformanceRankEntry {
                    rank: i + 1,
                    backend: m.name.clone(),
                    performance_score: score(m),
                    confidence: m.confidence,
                    speed: m.words_per_second,
                })
                .collect(),
            accuracy_ranking: accuracy
                .iter()
                .enumerate()
                .map(|(i, m)| AccuracyRankEntry {
                    rank: i + 1,
                    backend: m.name.clone(),
                    confidence: m.confidence,
                    total_words: m.total_words,
                })
                .collect(),
            speed_ranking: speed
                .iter()
                .enumerate()
                .map(|(i, m)| SpeedRankEntry {
                    rank: i + 1,
                    backend: m.name.clone(),
                    words_per_second: m.words_per_second,
                    processing_time: m.processing_time,
                })
                .collect(),
            statistics,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

/// Sort descending by the given metric, breaking exact ties by backend
/// name ascending.
fn ranked(metrics: &[BackendMetrics], key: impl Fn(&BackendMetrics) -> f64) -> Vec<BackendMetrics> {
    let mut sorted = metrics.to_vec();
    sorted.sort_by(|a, b| key(b).total_cmp(&key(a)).then_with(|| a.name.cmp(&b.name)));
    sorted
}

fn max_metric(metrics: &[BackendMetrics], key: impl Fn(&BackendMetrics) -> f64) -> f64 {
    metrics.iter().map(key).fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DocumentAggregator;
    use crate::models::report::ExtractionResult;
    use pretty_assertions::assert_eq;

    /// A successful outcome with the given confidence and word/time pair.
    fn outcome(name: &str, confidence: f64, words: usize, time: f64) -> BackendOutcome {
        let text = vec!["كلمة"; words].join(" ");
        let pages = vec![ExtractionResult::page(0, text, confidence, time, name)];
        let result = DocumentAggregator::default().aggregate(name, pages, time);
        assert_eq!(result.total_words, words);
        BackendOutcome::Success(Box::new(result))
    }

    fn results(
        entries: Vec<(&str, BackendOutcome)>,
    ) -> BTreeMap<String, BackendOutcome> {
        entries
            .into_iter()
            .map(|(name, outcome)| (name.to_string(), outcome))
            .collect()
    }

    fn names(ranking: &[AccuracyRankEntry]) -> Vec<&str> {
        ranking.iter().map(|e| e.backend.as_str()).collect()
    }

    #[test]
    fn test_spec_scenario_rankings() {
        // Confidences [0.9, 0.7, 0.5]; speeds [10, 20, 30] words/sec.
        let results = results(vec![
            ("b1", outcome("b1", 0.9, 100, 10.0)),
            ("b2", outcome("b2", 0.7, 200, 10.0)),
            ("b3", outcome("b3", 0.5, 300, 10.0)),
        ]);

        let summary = ScoringEngine::default().summarize(&results);

        assert_eq!(names(&summary.accuracy_ranking), vec!["b1", "b2", "b3"]);

        let speed_names: Vec<&str> = summary
            .speed_ranking
            .iter()
            .map(|e| e.backend.as_str())
            .collect();
        assert_eq!(speed_names, vec!["b3", "b2", "b1"]);

        // Blended ranking is a deterministic permutation of all three.
        let mut overall: Vec<&str> = summary
            .performance_ranking
            .iter()
            .map(|e| e.backend.as_str())
            .collect();
        assert_eq!(overall.len(), 3);
        overall.sort();
        assert_eq!(overall, vec!["b1", "b2", "b3"]);

        let ranks: Vec<usize> = summary.performance_ranking.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_blended_score_weighting() {
        // Same speed; the more confident backend must win overall.
        let results = results(vec![
            ("accurate", outcome("accurate", 0.9, 100, 10.0)),
            ("sloppy", outcome("sloppy", 0.5, 100, 10.0)),
        ]);

        let summary = ScoringEngine::default().summarize(&results);
        assert_eq!(summary.performance_ranking[0].backend, "accurate");
        assert!((summary.performance_ranking[0].performance_score - 1.0).abs() < 1e-9);
        assert_eq!(summary.statistics.best_overall.as_deref(), Some("accurate"));
    }

    #[test]
    fn test_exact_tie_breaks_lexicographically() {
        let results = results(vec![
            ("zeta", outcome("zeta", 0.8, 100, 10.0)),
            ("alpha", outcome("alpha", 0.8, 100, 10.0)),
        ]);

        let summary = ScoringEngine::default().summarize(&results);
        assert_eq!(names(&summary.accuracy_ranking), vec!["alpha", "zeta"]);
        assert_eq!(summary.performance_ranking[0].backend, "alpha");
        assert_eq!(summary.speed_ranking[0].backend, "alpha");
    }

    #[test]
    fn test_errored_backends_excluded_from_rankings() {
        let results = results(vec![
            ("good", outcome("good", 0.8, 100, 10.0)),
            (
                "broken",
                BackendOutcome::Failed {
                    error: "engine failed to initialize".to_string(),
                },
            ),
        ]);

        let summary = ScoringEngine::default().summarize(&results);
        assert_eq!(summary.accuracy_ranking.len(), 1);
        assert_eq!(summary.speed_ranking.len(), 1);
        assert_eq!(summary.performance_ranking.len(), 1);
        assert_eq!(summary.statistics.total_backends_tested, 1);
    }

    #[test]
    fn test_all_errored_yields_empty_summary() {
        let results = results(vec![(
            "broken",
            BackendOutcome::Failed {
                error: "boom".to_string(),
            },
        )]);

        let summary = ScoringEngine::default().summarize(&results);
        assert!(summary.accuracy_ranking.is_empty());
        assert!(summary.statistics.best_overall.is_none());
        assert_eq!(summary.statistics.total_backends_tested, 0);
    }

    #[test]
    fn test_statistics_means() {
        let results = results(vec![
            ("a", outcome("a", 0.6, 100, 10.0)),
            ("b", outcome("b", 0.8, 200, 10.0)),
        ]);

        let summary = ScoringEngine::default().summarize(&results);
        let stats = &summary.statistics;
        assert!((stats.avg_confidence - 0.7).abs() < 1e-9);
        assert!((stats.avg_processing_time - 10.0).abs() < 1e-9);
        assert!((stats.avg_words_extracted - 150.0).abs() < 1e-9);
        assert_eq!(stats.best_accuracy.as_deref(), Some("b"));
        assert_eq!(stats.fastest_backend.as_deref(), Some("b"));
    }

    #[test]
    fn test_zero_processing_time_guarded() {
        let results = results(vec![("instant", outcome("instant", 0.9, 50, 0.0))]);
        let summary = ScoringEngine::default().summarize(&results);
        let wps = summary.speed_ranking[0].words_per_second;
        assert!(wps.is_finite());
        assert!((wps - 50_000.0).abs() < 1e-6);
    }
}
