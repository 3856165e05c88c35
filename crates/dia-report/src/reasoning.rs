//! Judges sometimes put their raw structured output in the reasoning field.
//! That text is data, not prose, and is not shown.

/// Whether `text` looks like a serialized object rather than prose.
#[must_use]
pub fn is_structured_reasoning(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        // Valid JSON, or a dict-like dump with at least one key separator
        if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() || trimmed.contains(':') {
            return true;
        }
    }
    text.find("winner_id")
        .is_some_and(|at| text[at..].contains("participant_id"))
}
