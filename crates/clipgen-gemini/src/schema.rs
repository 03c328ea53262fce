//! Response schema and contract validation.

use clipgen_models::Strategy;
use serde_json::{json, Value};

use crate::error::{StrategyError, StrategyResult};

/// Top-level fields every strategy must carry.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "title",
    "description",
    "hashtags",
    "viralScore",
    "platforms",
    "highlightSegments",
];

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

/// Gemini `responseSchema` (OpenAPI subset) for a [`Strategy`].
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "description": { "type": "STRING" },
            "hashtags": string_array(),
            "viralScore": { "type": "NUMBER" },
            "platforms": {
                "type": "OBJECT",
                "properties": {
                    "youtube": {
                        "type": "OBJECT",
                        "properties": {
                            "title": { "type": "STRING" },
                            "tags": string_array()
                        },
                        "required": ["title", "tags"]
                    },
                    "tiktok": {
                        "type": "OBJECT",
                        "properties": {
                            "caption": { "type": "STRING" },
                            "tags": string_array()
                        },
                        "required": ["caption", "tags"]
                    }
                },
                "required": ["youtube", "tiktok"]
            },
            "highlightSegments": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "start": { "type": "NUMBER" },
                        "end": { "type": "NUMBER" },
                        "description": { "type": "STRING" }
                    },
                    "required": ["start", "end", "description"]
                }
            }
        },
        "required": REQUIRED_FIELDS
    })
}

/// Strip a surrounding Markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Parse and validate the model's text output.
///
/// The text is untrusted: empty output, non-JSON, a non-object, an empty
/// object and a missing or mistyped field are all contract violations.
pub fn parse_strategy_text(text: &str) -> StrategyResult<Strategy> {
    let text = strip_code_fence(text);
    if text.is_empty() {
        return Err(StrategyError::contract("response text is empty"));
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| StrategyError::contract(format!("response is not JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| StrategyError::contract("response is not a JSON object"))?;
    if object.is_empty() {
        return Err(StrategyError::contract("response is an empty object"));
    }

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
        return Err(StrategyError::contract(format!(
            "missing required field `{}`",
            missing
        )));
    }

    serde_json::from_value(value).map_err(|e| StrategyError::contract(e.to_string()))
}
