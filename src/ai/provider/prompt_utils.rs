//! Prompt framing shared by providers.

use serde_json::Value;

const ANALYST_ROLE: &str = "You are a senior data scientist and ML product strategist. \
     You analyze tabular datasets and produce precise, practical recommendations.";

fn schema_block(schema: &Value) -> String {
    let schema_str = serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    format!(
        "Respond with a single JSON object matching this schema:\n```json\n{}\n```\n\nRespond ONLY with valid JSON, no explanation.",
        schema_str
    )
}

/// System message for chat-style providers.
pub fn build_system_prompt(schema: &Value) -> String {
    if schema.is_null() {
        return format!("{} Always respond with valid JSON.", ANALYST_ROLE);
    }
    format!("{}\n\n{}", ANALYST_ROLE, schema_block(schema))
}

/// Single prompt for completion-style providers (Ollama).
pub fn build_schema_prompt(user_prompt: &str, schema: &Value) -> String {
    if schema.is_null() {
        return format!("{}\n\n{}", ANALYST_ROLE, user_prompt);
    }
    format!(
        "{}\n\n{}\n\n---\n\n{}",
        ANALYST_ROLE,
        user_prompt,
        schema_block(schema)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_system_prompt_null_schema() {
        let result = build_system_prompt(&Value::Null);
        assert!(result.contains("valid JSON"));
        assert!(!result.contains("```json"));
    }

    #[test]
    fn test_schema_prompt_with_schema() {
        let schema = json!({"type": "object", "properties": {"insight": {"type": "string"}}});
        let result = build_schema_prompt("Profile these columns", &schema);

        assert!(result.contains("Profile these columns"));
        assert!(result.contains("\"insight\""));
        assert!(result.ends_with("no explanation."));
    }
}
