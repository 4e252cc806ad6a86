//! Legal document-type heuristic.
//!
//! Counts domain keyword occurrences per category over the lower-cased
//! full text and picks the category with the most hits. Categories are
//! evaluated in a fixed order and only a strictly greater count replaces
//! the current winner, so ties resolve to the earliest category.

use serde::{Deserialize, Serialize};

use crate::models::config::AnalysisConfig;
use crate::patterns::{ARTICLE_REF, DATE_MARKER};

/// Detected legal document category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Unknown,
    Regulation,
    CourtRuling,
    Contract,
    LawArticle,
    JudicialCollection,
}

impl DocumentType {
    /// Stable name used in reports and console output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Regulation => "regulation",
            Self::CourtRuling => "court_ruling",
            Self::Contract => "contract",
            Self::LawArticle => "law_article",
            Self::JudicialCollection => "judicial_collection",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category evaluation order is part of the contract: on equal keyword
/// counts the earlier entry wins.
const CATEGORY_TERMS: &[(DocumentType, &[&str])] = &[
    (DocumentType::Regulation, &["نظام", "لائحة", "قانون", "تنظيم"]),
    (DocumentType::CourtRuling, &["حكم", "قرار", "محكمة", "قضية", "دعوى"]),
    (DocumentType::Contract, &["عقد", "اتفاقية", "مقاولة", "شراكة"]),
    (DocumentType::LawArticle, &["مادة", "فقرة", "بند", "فصل"]),
    (DocumentType::JudicialCollection, &["مجموعة", "أحكام", "قضائية", "سابقة"]),
];

/// Outcome of the document-type heuristic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    /// Winning category, or `Unknown` when no keyword matched.
    pub document_type: DocumentType,

    /// `min(max_count / divisor, 1.0)` - a saturating normalization,
    /// not a probability.
    pub type_confidence: f64,

    /// Keywords actually present, across all categories.
    pub legal_terms_found: Vec<String>,

    /// Count of statutory article references.
    pub article_count: usize,

    /// Whether any date-like pattern occurs in the text.
    pub contains_dates: bool,
}

impl DocumentAnalysis {
    fn empty() -> Self {
        Self {
            document_type: DocumentType::Unknown,
            type_confidence: 0.0,
            legal_terms_found: Vec::new(),
            article_count: 0,
            contains_dates: false,
        }
    }
}

/// Keyword-based document classifier.
#[derive(Debug, Clone)]
pub struct DocumentClassifier {
    config: AnalysisConfig,
}

impl DocumentClassifier {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze full document text and classify its legal category.
    pub fn analyze(&self, text: &str) -> DocumentAnalysis {
        if text.trim().is_empty() {
            return DocumentAnalysis::empty();
        }

        let lowered = text.to_lowercase();

        let mut max_count = 0usize;
        let mut detected = DocumentType::Unknown;
        let mut terms_found = Vec::new();

        for (category, terms) in CATEGORY_TERMS {
            let count: usize = terms.iter().map(|term| lowered.matches(term).count()).sum();
            if count > max_count {
                max_count = count;
                detected = *category;
            }
            for term in *terms {
                if lowered.contains(term) {
                    terms_found.push((*term).to_string());
                }
            }
        }

        let divisor = self.config.type_confidence_divisor.max(1.0);
        DocumentAnalysis {
            document_type: detected,
            type_confidence: (max_count as f64 / divisor).min(1.0),
            legal_terms_found: terms_found,
            article_count: ARTICLE_REF.find_iter(text).count(),
            contains_dates: DATE_MARKER.is_match(text),
        }
    }
}

impl Default for DocumentClassifier {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classifier() -> DocumentClassifier {
        DocumentClassifier::default()
    }

    #[test]
    fn test_empty_text_is_unknown() {
        let analysis = classifier().analyze("");
        assert_eq!(analysis.document_type, DocumentType::Unknown);
        assert_eq!(analysis.type_confidence, 0.0);
        assert!(analysis.legal_terms_found.is_empty());
    }

    #[test]
    fn test_regulation_keywords_win() {
        let analysis = classifier().analyze("نظام الإثبات الصادر بموجب قانون التنفيذ واللائحة نظام");
        assert_eq!(analysis.document_type, DocumentType::Regulation);
        assert!(analysis.legal_terms_found.contains(&"نظام".to_string()));
        assert!(analysis.legal_terms_found.contains(&"قانون".to_string()));
    }

    #[test]
    fn test_court_ruling_keywords_win() {
        let analysis = classifier().analyze("حكم محكمة الاستئناف في قضية الدعوى رقم حكم قرار");
        assert_eq!(analysis.document_type, DocumentType::CourtRuling);
    }

    #[test]
    fn test_tie_keeps_first_category() {
        // One regulation keyword, one contract keyword: equal counts, and
        // regulation is evaluated first.
        let analysis = classifier().analyze("نظام ثم عقد");
        assert_eq!(analysis.document_type, DocumentType::Regulation);
    }

    #[test]
    fn test_confidence_saturates() {
        let text = "نظام ".repeat(25);
        let analysis = classifier().analyze(&text);
        assert_eq!(analysis.type_confidence, 1.0);
    }

    #[test]
    fn test_confidence_scales_with_count() {
        let analysis = classifier().analyze("عقد اتفاقية مقاولة");
        assert_eq!(analysis.document_type, DocumentType::Contract);
        assert!((analysis.type_confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_article_count() {
        let analysis = classifier().analyze("مادة 1 نصت على كذا، ثم مادة 2 ثم مادة 15");
        assert_eq!(analysis.article_count, 3);
    }

    #[test]
    fn test_contains_dates() {
        assert!(classifier().analyze("صدر بتاريخ 2022/3/14 بالرياض").contains_dates);
        assert!(classifier().analyze("في عام 1443هـ").contains_dates);
        assert!(!classifier().analyze("لا يوجد تاريخ").contains_dates);
    }
}
