//! Input normalization shared by every matcher.

/// Lower-case and trim `text`.
///
/// Matching is substring based and not aware of word boundaries, so this is
/// the only canonicalization applied to user input.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
