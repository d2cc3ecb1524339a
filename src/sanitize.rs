//! Turning raw model output into a [`ChatReply`].
//!
//! The model is asked for bare JSON but does not always comply, so parsing
//! falls back to the outermost `{...}` span of the text. Field values are
//! then coerced into the shape the chat UI expects.

use crate::models::{ChatReply, Mood, Resource, Tone};
use serde_json::Value;
use thiserror::Error;

pub const MAX_RESOURCES: usize = 3;

#[derive(Error, Debug, PartialEq)]
pub enum SanitizeError {
    #[error("Failed to parse model output")]
    Unparsable { raw: String },

    #[error("Empty response from model")]
    EmptyReply,
}

/// Parse model text as JSON, falling back to the span between the first
/// `{` and the last `}`.
pub fn parse_model_output(text: &str) -> Result<Value, SanitizeError> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    let unparsable = || SanitizeError::Unparsable {
        raw: text.to_string(),
    };

    let start = text.find('{').ok_or_else(unparsable)?;
    let end = text.rfind('}').filter(|&end| end > start).ok_or_else(unparsable)?;

    serde_json::from_str(&text[start..=end]).map_err(|_| unparsable())
}

pub fn sanitize(value: &Value) -> Result<ChatReply, SanitizeError> {
    let reply = text_field(value, "reply").unwrap_or_default();
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(SanitizeError::EmptyReply);
    }

    let mood = text_field(value, "mood")
        .and_then(|s| Mood::parse(&s))
        .unwrap_or_default();
    let tone = text_field(value, "tone")
        .and_then(|s| Tone::parse(&s))
        .unwrap_or_default();

    Ok(ChatReply {
        reply: reply.to_string(),
        mood,
        tone,
        resources: resources(value.get("resources")),
        action: text_field(value, "action"),
    })
}

pub fn parse_and_sanitize(text: &str) -> Result<ChatReply, SanitizeError> {
    sanitize(&parse_model_output(text)?)
}

// slice first, then filter: a junk entry in the first three still uses a slot
fn resources(value: Option<&Value>) -> Vec<Resource> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .take(MAX_RESOURCES)
        .filter(|item| item.is_object())
        .map(|item| {
            let url = text_field(item, "url");
            let title = text_field(item, "title")
                .or_else(|| url.clone())
                .unwrap_or_else(|| "Resource".to_string());

            Resource {
                title: title.trim().to_string(),
                url: url.unwrap_or_else(|| "#".to_string()).trim().to_string(),
            }
        })
        .collect()
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(coerce_text)
}

/// Loose text coercion: falsy values (empty string, zero, `false`, null)
/// count as missing; objects read as `[object Object]` and arrays as their
/// elements joined with commas.
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Bool(false) | Value::Null => None,
        other => Some(stringify(other)),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(_) => "[object Object]".to_string(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
    }
}
