/*!
 * Defensive parsing of model responses.
 *
 * Engines expect JSON but models routinely wrap it in prose ("Here is the
 * translation: {...}"). Extraction is a two-stage strategy: strict parse
 * first, then a best-effort balanced-brace span. Total failure yields None so
 * callers can apply their per-field guards uniformly instead of handling a
 * parse exception.
 */

use serde_json::Value;

use super::{DEFAULT_CONFIDENCE, LineTranslation, SourceLine};

/// Extract a JSON object from text that may wrap it in prose.
pub fn json_from_prose(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }

    let span = balanced_object_span(text)?;
    serde_json::from_str::<Value>(span).ok()
}

/// Find the first balanced `{...}` span in the text.
///
/// Tracks string literals and escapes so braces inside quoted values do not
/// confuse the depth count. Returns None when no opening brace exists or the
/// object never closes.
fn balanced_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a batch translation response against the chunk it answers.
///
/// Output cardinality always equals input cardinality: an index the model
/// skipped yields an empty-text, default-confidence placeholder rather than a
/// missing entry.
pub fn parse_batch_response(content: &str, chunk: &[SourceLine]) -> Vec<LineTranslation> {
    let parsed = json_from_prose(content);
    let lines = parsed
        .as_ref()
        .and_then(|value| value.get("lines"))
        .and_then(|lines| lines.as_array());

    chunk
        .iter()
        .map(|line| {
            let answer = lines.and_then(|entries| {
                entries
                    .iter()
                    .find(|entry| entry.get("idx").and_then(Value::as_i64) == Some(line.idx))
            });
            LineTranslation {
                idx: line.idx,
                text: answer
                    .and_then(|entry| entry.get("text"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                confidence: answer
                    .and_then(|entry| entry.get("confidence"))
                    .and_then(Value::as_f64)
                    .unwrap_or(DEFAULT_CONFIDENCE),
            }
        })
        .collect()
}
