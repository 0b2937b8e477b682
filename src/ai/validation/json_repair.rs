//! JSON Extraction and Repair
//!
//! Chat models asked for JSON still return:
//! - Markdown code fences (```json ... ```)
//! - Prose before or after the object
//! - Trailing commas
//! - Output cut off mid-object when `max_tokens` is reached

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::types::{ErrorCategory, PlanError, Result};

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*\n?(.*?)\n?\s*```").expect("static regex")
});

/// Extract and parse the JSON object from an LLM response.
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    JsonRepairer::new().parse_or_repair(content).map(|(value, _)| value)
}

/// JSON repair strategies, tried from least to most invasive
#[derive(Debug, Default)]
pub struct JsonRepairer;

impl JsonRepairer {
    pub fn new() -> Self {
        Self
    }

    /// Returns (value, was_repaired)
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, bool)> {
        let cleaned = strip_code_fence(raw.trim_start_matches('\u{feff}').trim());

        if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
            return Ok((value, false));
        }
        debug!("Direct JSON parse failed, attempting repair");

        let candidate = slice_from_first_opener(cleaned).unwrap_or(cleaned);

        if let Some(complete) = balanced_prefix(candidate)
            && let Ok(value) = serde_json::from_str::<Value>(complete)
        {
            warn!("JSON extracted from surrounding text");
            return Ok((value, true));
        }

        let repaired = close_open_structures(&remove_trailing_commas(candidate));
        if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
            warn!("JSON repaired (trailing commas or truncated output)");
            return Ok((value, true));
        }

        Err(PlanError::llm_with_category(
            ErrorCategory::ParseError,
            format!(
                "response is not valid JSON. Content preview: {}...",
                cleaned.chars().take(200).collect::<String>()
            ),
        ))
    }
}

fn strip_code_fence(s: &str) -> &str {
    match CODE_FENCE.captures(s).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => s,
    }
}

fn slice_from_first_opener(s: &str) -> Option<&str> {
    s.find(['{', '[']).map(|idx| &s[idx..])
}

/// Walk string-aware through `s` and yield each structural character.
fn scan(s: &str, mut visit: impl FnMut(usize, char) -> bool) -> bool {
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in s.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        if ch == '"' {
            in_string = true;
        }
        if !visit(idx, ch) {
            return in_string;
        }
    }
    in_string
}

/// The shortest prefix of `s` that closes the first opened object/array.
fn balanced_prefix(s: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut end = None;
    scan(s, |idx, ch| {
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    end = Some(idx + ch.len_utf8());
                    return false;
                }
            }
            _ => {}
        }
        true
    });
    end.map(|e| &s[..e])
}

fn remove_trailing_commas(s: &str) -> String {
    let mut drop = Vec::new();
    let mut pending_comma: Option<usize> = None;
    scan(s, |idx, ch| {
        match ch {
            ',' => pending_comma = Some(idx),
            '}' | ']' => {
                if let Some(c) = pending_comma.take() {
                    drop.push(c);
                }
            }
            c if c.is_whitespace() => {}
            _ => pending_comma = None,
        }
        true
    });
    s.char_indices()
        .filter(|(idx, _)| !drop.contains(idx))
        .map(|(_, ch)| ch)
        .collect()
}

/// Close an unterminated string and any still-open containers, innermost first.
fn close_open_structures(s: &str) -> String {
    let mut stack = Vec::new();
    let open_string = scan(s, |_, ch| {
        match ch {
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
        true
    });

    let mut out = s.trim_end().to_string();
    if open_string {
        out.push('"');
    }
    let trimmed = out.trim_end_matches([',', ':', ' ', '\n', '\t']).len();
    out.truncate(trimmed);
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json() {
        let (value, repaired) = JsonRepairer::new()
            .parse_or_repair(r#"{"a": 1}"#)
            .unwrap();
        assert_eq!(value, json!({"a": 1}));
        assert!(!repaired);
    }

    #[test]
    fn test_code_fence() {
        let raw = "```json\n{\"use_case\": \"regression\"}\n```";
        let value = extract_json_from_response(raw).unwrap();
        assert_eq!(value["use_case"], "regression");
    }

    #[test]
    fn test_prose_around_object() {
        let raw = "Sure! Here is the analysis:\n{\"score\": 80, \"note\": \"has } brace\"}\nHope it helps.";
        let (value, repaired) = JsonRepairer::new().parse_or_repair(raw).unwrap();
        assert_eq!(value["score"], 80);
        assert_eq!(value["note"], "has } brace");
        assert!(repaired);
    }

    #[test]
    fn test_trailing_commas() {
        let raw = r#"{"items": [1, 2, 3,], "name": "x",}"#;
        let value = extract_json_from_response(raw).unwrap();
        assert_eq!(value["items"], json!([1, 2, 3]));
    }

    #[test]
    fn test_truncated_output() {
        let raw = r#"{"plan": {"steps": ["load", "clean"#;
        let value = extract_json_from_response(raw).unwrap();
        assert_eq!(value["plan"]["steps"], json!(["load", "clean"]));
    }

    #[test]
    fn test_unrecoverable() {
        let err = extract_json_from_response("no json here at all").unwrap_err();
        assert_eq!(err.category(), Some(ErrorCategory::ParseError));
    }
}
