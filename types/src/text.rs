//! Small pure text helpers.

use unicode_normalization::UnicodeNormalization;

/// Normalize puzzle text so later equality checks can be exact-string.
///
/// - Composes to NFC so precomposed and combining forms compare equal.
/// - Collapses every whitespace run to a single space and trims the ends.
/// - Uppercases per Unicode default casing.
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    let composed: String = raw.nfc().collect();
    let mut out = String::with_capacity(composed.len());
    for word in composed.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_uppercase));
    }
    out
}
