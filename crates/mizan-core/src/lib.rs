//! Core library for Arabic legal-document OCR evaluation.
//!
//! This crate provides:
//! - Per-page needs-OCR classification for scanned vs. digitally-authored pages
//! - A uniform backend contract for pluggable OCR engines
//! - Multi-backend comparison orchestration with per-backend failure isolation
//! - Accuracy/speed/blended scoring and ranked comparison reports
//! - Document aggregation with a legal-document-type heuristic

pub mod aggregate;
pub mod analysis;
pub mod backend;
pub mod classify;
pub mod error;
pub mod eval;
pub mod models;
pub mod patterns;
pub mod pdf;
pub mod text;

pub use aggregate::DocumentAggregator;
pub use analysis::{DocumentAnalysis, DocumentClassifier, DocumentType};
pub use backend::{BackendRegistry, OcrBackend};
pub use classify::PageClassifier;
pub use error::{BackendError, MizanError, PdfError, Result};
pub use eval::{ComparisonOrchestrator, ScoringEngine};
pub use models::config::MizanConfig;
pub use models::report::{
    BackendOutcome, ComparisonReport, DocumentResult, ExtractionReport, ExtractionResult,
};
pub use pdf::{PdfExtractor, PdfProcessor};
