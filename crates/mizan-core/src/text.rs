//! Arabic text cleaning and token counting.

use crate::patterns::DIACRITICS;

/// Clean and normalize Arabic text.
///
/// Collapses whitespace, normalizes alef variants, teh marbuta and yeh,
/// and strips diacritics and tatweel. Keeps non-Arabic characters as-is.
pub fn clean_arabic_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let normalized: String = collapsed
        .chars()
        .map(|c| match c {
            'أ' | 'إ' | 'آ' => 'ا',
            'ة' => 'ه',
            'ي' => 'ى',
            other => other,
        })
        .collect();

    DIACRITICS.replace_all(&normalized, "").trim().to_string()
}

/// Count whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
