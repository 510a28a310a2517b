//! Helpers for reading JSON out of model output.

/// Strip a surrounding Markdown code fence (```` ```json ... ``` ````) if present.
///
/// Providers without a native JSON mode tend to wrap objects in a fence even
/// when told not to. Anything else is returned trimmed but otherwise untouched.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `JSON`, ...) on the opening line.
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}
