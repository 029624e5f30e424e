//! Null and boolean token normalization

use std::borrow::Cow;

/// Tokens (compared case-insensitively, after trimming) that mean "no value".
pub const NULL_TOKENS: &[&str] = &["na", "n/a", "", "--", "null", "not reported", "unknown"];

/// Normalize a raw cell value.
///
/// Returns `None` for null-like tokens, `"True"`/`"False"` for boolean-like
/// tokens and the trimmed value otherwise.
pub fn normalize(raw: &str) -> Option<Cow<'_, str>> {
    let trimmed = raw.trim();
    let lowered = trimmed.to_ascii_lowercase();

    if NULL_TOKENS.contains(&lowered.as_str()) {
        return None;
    }

    match lowered.as_str() {
        "true" => Some(Cow::Borrowed("True")),
        "false" => Some(Cow::Borrowed("False")),
        _ => Some(Cow::Borrowed(trimmed)),
    }
}
