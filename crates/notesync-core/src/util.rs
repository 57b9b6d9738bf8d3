//! Shared utility functions used across multiple modules.

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Longest error text, in characters, surfaced from a response body.
pub const MAX_ERROR_TEXT_CHARS: usize = 180;

/// Fold a response body onto one line for an error message.
///
/// Whitespace runs collapse to single spaces and the result is cut at
/// `MAX_ERROR_TEXT_CHARS` characters, never inside a character.
pub fn compact_text(value: &str) -> String {
    let mut compact = String::with_capacity(value.len().min(MAX_ERROR_TEXT_CHARS));
    for (count, word) in value.split_whitespace().enumerate() {
        if count > 0 {
            compact.push(' ');
        }
        compact.push_str(word);
        if compact.chars().count() >= MAX_ERROR_TEXT_CHARS {
            break;
        }
    }
    compact.chars().take(MAX_ERROR_TEXT_CHARS).collect()
}
