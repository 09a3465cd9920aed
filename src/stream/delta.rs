//! Delta extractor — `choices[0].delta.content` from a chat-completions chunk.

use serde_json::Value;

use crate::error::ChatError;

/// Pull the text fragment out of one decoded data payload.
///
/// A missing, null, non-string or empty `content` is "no fragment", not an
/// error. Only a payload that is not JSON at all is reported, as
/// [`ChatError::MalformedRecord`].
///
/// # Errors
///
/// Returns [`ChatError::MalformedRecord`] when `payload` is not valid JSON.
pub fn extract_fragment(payload: &str) -> Result<Option<String>, ChatError> {
    let root: Value = serde_json::from_str(payload).map_err(|e| ChatError::MalformedRecord(e.to_string()))?;
    let fragment = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_owned);
    Ok(fragment)
}

#[cfg(test)]
#[path = "delta_test.rs"]
mod tests;
