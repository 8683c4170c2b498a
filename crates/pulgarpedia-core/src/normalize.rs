//! Accent- and case-insensitive text folding for search.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold `text` for substring matching.
///
/// Lower-cases, decomposes to NFD, drops combining marks, then trims,
/// so `"  Volcán "` and `"volcan"` fold to the same string.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    folded.trim().to_string()
}
