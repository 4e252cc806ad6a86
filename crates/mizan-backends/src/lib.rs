//! OCR backend adapters for mizan.
//!
//! Three adapters satisfy the core backend contract:
//! - `direct` reads the embedded text layer
//! - `tesseract` rasterizes pages and runs the system Tesseract binary
//! - `smart` decides per page between the two using the needs-OCR
//!   classifier
//!
//! [`build_registry`] probes each engine once and records the ones that
//! cannot run with a structured unavailability reason.

mod direct;
mod smart;
mod tesseract;

pub use direct::DirectTextBackend;
pub use smart::SmartBackend;
pub use tesseract::TesseractBackend;

use std::sync::Arc;

use tracing::info;

use mizan_core::error::BackendError;
use mizan_core::models::config::MizanConfig;
use mizan_core::BackendRegistry;

/// Build the session backend registry.
///
/// Probing happens exactly once here; an engine that fails its probe is
/// excluded from the available set for the whole session. The smart
/// backend is always registered - without an OCR engine it degrades to
/// direct extraction for pages that would have needed OCR.
pub fn build_registry(config: &MizanConfig) -> BackendRegistry {
    let mut registry = BackendRegistry::new();

    registry.register(Arc::new(DirectTextBackend::new()));

    let ocr_engine = match TesseractBackend::probe() {
        Ok(()) => {
            let tesseract = TesseractBackend::new(&config.ocr);
            registry.register(Arc::new(tesseract.clone()));
            Some(tesseract)
        }
        Err(BackendError::Unavailable { reason }) => {
            registry.register_unavailable(tesseract::BACKEND_NAME, reason);
            None
        }
        Err(other) => {
            registry.register_unavailable(tesseract::BACKEND_NAME, other.to_string());
            None
        }
    };

    registry.register(Arc::new(SmartBackend::new(
        config.classifier.clone(),
        ocr_engine,
    )));

    info!(
        available = ?registry.available_names(),
        unavailable = registry.unavailable().len(),
        "backend registry initialized"
    );
    registry
}
