//! Null-tolerant readers for the loosely-typed values a voice agent posts.
//!
//! The agent platform fills fields from LLM output, so the same field may
//! arrive as a string, a number, a boolean, an empty string, or the literal
//! text `"null"`. Everything here maps that noise onto `Option`.

use serde_json::Value;

/// Placeholder strings that mean "no value"
const EMPTY_MARKERS: &[&str] = &["null", "undefined", "n/a", "none"];

/// Reads a value as a trimmed, non-empty string
///
/// Numbers are rendered as text; booleans, arrays, objects and the
/// placeholder strings in [`EMPTY_MARKERS`] give `None`.
pub fn normalize_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || EMPTY_MARKERS.iter().any(|m| trimmed.eq_ignore_ascii_case(m)) {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a value as a boolean
///
/// Accepts JSON booleans, the numbers 0 and 1, and yes/no style strings.
pub fn parse_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 1.0 => Some(true),
            Some(x) if x == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Reads a value as a non-negative whole number of seconds
pub fn parse_seconds(value: &Value) -> Option<i32> {
    let secs = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if secs.is_finite() && secs >= 0.0 && secs <= i32::MAX as f64 {
        Some(secs.round() as i32)
    } else {
        None
    }
}

/// Flattens a transcript into plain text
///
/// A string is normalized as-is. An array of turns (`{role, message}`)
/// becomes one `Speaker: message` line per turn with a non-empty message.
pub fn build_transcript_text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => normalize_string(value),
        Value::Array(turns) => {
            let lines: Vec<String> = turns
                .iter()
                .filter_map(|turn| {
                    let message = turn.get("message").and_then(normalize_string)?;
                    let speaker = turn
                        .get("role")
                        .and_then(normalize_string)
                        .map(|role| speaker_label(&role))
                        .unwrap_or_else(|| "Unknown".to_string());
                    Some(format!("{}: {}", speaker, message))
                })
                .collect();
            if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            }
        }
        _ => None,
    }
}

fn speaker_label(role: &str) -> String {
    match role.to_lowercase().as_str() {
        "agent" | "assistant" | "ai" => "Agent".to_string(),
        "user" | "caller" | "customer" => "Caller".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => "Unknown".to_string(),
            }
        }
    }
}

/// Follows a dotted path such as `metadata.phone_call.external_number`
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}
