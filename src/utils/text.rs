/// Maximum characters kept for a session preview
pub(crate) const PREVIEW_MAX_CHARS: usize = 100;

/// Collapse every whitespace run into a single space and trim both ends
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters, never splitting a code point
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Normalized preview text, or `None` when nothing visible remains
pub(crate) fn preview_text(text: &str) -> Option<String> {
    let collapsed = collapse_whitespace(text);
    if collapsed.is_empty() {
        return None;
    }
    Some(truncate_chars(&collapsed, PREVIEW_MAX_CHARS))
}
