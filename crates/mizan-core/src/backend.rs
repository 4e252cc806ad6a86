//! Backend capability contract and registry.
//!
//! The orchestrator depends only on the [`OcrBackend`] trait; concrete
//! engines live in a separate crate. The registry is built once at
//! startup - an engine that fails its availability probe is recorded
//! with a structured reason and stays out of the available set for the
//! whole session.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::error::BackendError;
use crate::models::report::ExtractionReport;

/// Contract every OCR or text-extraction engine must satisfy.
///
/// Implementations must encode page-level failures as error entries in
/// the report rather than returning `Err`, must populate
/// `processing_time` even when every page failed, and must be safe to
/// invoke from multiple threads concurrently.
pub trait OcrBackend: Send + Sync {
    /// Stable backend name used as the report key.
    fn name(&self) -> &str;

    /// Extract text from a document.
    ///
    /// `pages` is an optional ordered set of 0-based page indices;
    /// `None` means every page. `dpi` is the requested rasterization
    /// resolution for engines that render pages.
    fn extract(
        &self,
        pdf_path: &Path,
        pages: Option<&[usize]>,
        dpi: u32,
    ) -> Result<ExtractionReport, BackendError>;
}

/// A backend that failed its availability probe.
#[derive(Debug, Clone)]
pub struct UnavailableBackend {
    pub name: String,
    pub reason: String,
}

/// Explicit backend registry, constructed once at startup.
#[derive(Default)]
pub struct BackendRegistry {
    backends: Vec<Arc<dyn OcrBackend>>,
    unavailable: Vec<UnavailableBackend>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an available backend. Registration order is the
    /// sequential-comparison execution order.
    pub fn register(&mut self, backend: Arc<dyn OcrBackend>) {
        self.backends.push(backend);
    }

    /// Record a backend that failed to initialize, with its reason.
    pub fn register_unavailable(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        let entry = UnavailableBackend {
            name: name.into(),
            reason: reason.into(),
        };
        warn!(backend = %entry.name, reason = %entry.reason, "backend unavailable");
        self.unavailable.push(entry);
    }

    /// Look up an available backend by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn OcrBackend>> {
        self.backends.iter().find(|b| b.name() == name).cloned()
    }

    /// Names of all available backends, in registration order.
    pub fn available_names(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.name().to_string()).collect()
    }

    /// Backends recorded as unavailable, with their reasons.
    pub fn unavailable(&self) -> &[UnavailableBackend] {
        &self.unavailable
    }

    /// Select backends for a comparison run.
    ///
    /// With `names = None` every available backend is selected.
    /// Requested names that are not available are skipped with a
    /// warning rather than failing the whole comparison.
    pub fn select(&self, names: Option<&[String]>) -> Vec<Arc<dyn OcrBackend>> {
        match names {
            None => self.backends.clone(),
            Some(requested) => requested
                .iter()
                .filter_map(|name| {
                    let found = self.get(name);
                    if found.is_none() {
                        warn!(backend = %name, "requested backend is not available, skipping");
                    }
                    found
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::ExtractionResult;
    use pretty_assertions::assert_eq;

    struct FakeBackend {
        name: String,
    }

    impl OcrBackend for FakeBackend {
        fn name(&self) -> &str {
            &self.name
        }

        fn extract(
            &self,
            _pdf_path: &Path,
            pages: Option<&[usize]>,
            _dpi: u32,
        ) -> Result<ExtractionReport, BackendError> {
            let indices = pages.map(|p| p.to_vec()).unwrap_or_else(|| vec![0]);
            let results = indices
                .iter()
                .map(|&i| ExtractionResult::page(i, "text".to_string(), 1.0, 0.0, &self.name))
                .collect();
            Ok(ExtractionReport::from_pages(&self.name, results, 0.0))
        }
    }

    fn fake(name: &str) -> Arc<dyn OcrBackend> {
        Arc::new(FakeBackend {
            name: name.to_string(),
        })
    }

    #[test]
    fn test_registry_lookup_and_order() {
        let mut registry = BackendRegistry::new();
        registry.register(fake("direct"));
        registry.register(fake("tesseract"));

        assert_eq!(registry.available_names(), vec!["direct", "tesseract"]);
        assert!(registry.get("direct").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_unavailable_backends_keep_reason_and_stay_out() {
        let mut registry = BackendRegistry::new();
        registry.register(fake("direct"));
        registry.register_unavailable("tesseract", "binary not found on PATH");

        assert_eq!(registry.available_names(), vec!["direct"]);
        assert_eq!(registry.unavailable().len(), 1);
        assert_eq!(registry.unavailable()[0].name, "tesseract");
        assert_eq!(registry.unavailable()[0].reason, "binary not found on PATH");
        assert!(registry.get("tesseract").is_none());
    }

    #[test]
    fn test_select_subset_skips_unknown_names() {
        let mut registry = BackendRegistry::new();
        registry.register(fake("direct"));
        registry.register(fake("smart"));

        let selected = registry.select(Some(&[
            "smart".to_string(),
            "nonexistent".to_string(),
        ]));
        let names: Vec<&str> = selected.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["smart"]);

        let all = registry.select(None);
        assert_eq!(all.len(), 2);
    }
}
