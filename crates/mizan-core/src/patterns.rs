//! Common regex patterns for Arabic legal text analysis.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Characters considered "valid" when judging embedded-text quality:
    // Arabic letters (base + supplement blocks), ASCII letters/digits,
    // whitespace, and basic punctuation.
    pub static ref VALID_TEXT_CHAR: Regex = Regex::new(
        r"[\u{0600}-\u{06FF}\u{0750}-\u{077F}a-zA-Z0-9\s.,:;!?()\-+=]"
    ).unwrap();

    // Statutory article references: "مادة 12" and the like.
    pub static ref ARTICLE_REF: Regex = Regex::new(
        r"مادة\s*(\d+)"
    ).unwrap();

    // Date markers: Gregorian slashed dates, Hijri year suffix "هـ",
    // or a year followed by "م".
    pub static ref DATE_MARKER: Regex = Regex::new(
        r"\d{4}/\d{1,2}/\d{1,2}|\d{4}هـ|\d{4}\s*م"
    ).unwrap();

    // Arabic diacritics plus tatweel.
    pub static ref DIACRITICS: Regex = Regex::new(
        r"[\u{064B}-\u{065F}\u{0670}\u{0640}]"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_char_matches_arabic_and_ascii() {
        assert!(VALID_TEXT_CHAR.is_match("م"));
        assert!(VALID_TEXT_CHAR.is_match("a"));
        assert!(VALID_TEXT_CHAR.is_match("7"));
        assert!(VALID_TEXT_CHAR.is_match("?"));
        assert!(!VALID_TEXT_CHAR.is_match("□"));
        assert!(!VALID_TEXT_CHAR.is_match("\u{FFFD}"));
    }

    #[test]
    fn test_article_ref() {
        let caps = ARTICLE_REF.captures("مادة 12").unwrap();
        assert_eq!(&caps[1], "12");
        assert_eq!(ARTICLE_REF.find_iter("مادة 1 ثم مادة 2").count(), 2);
    }

    #[test]
    fn test_date_marker() {
        assert!(DATE_MARKER.is_match("بتاريخ 2023/5/14"));
        assert!(DATE_MARKER.is_match("عام 1444هـ"));
        assert!(DATE_MARKER.is_match("سنة 2021 م"));
        assert!(!DATE_MARKER.is_match("لا تاريخ هنا"));
    }
}
