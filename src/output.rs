//! Output formatting and control utilities.
//!
//! CHANGELOG:
//! - 10/16/2026 - Character-safe truncation
//! - 10/15/2026 - Initial implementation

use serde::Serialize;
use serde_json::{json, Value};

/// Output control settings from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct OutputControls {
    pub json: bool,
    pub compact: bool,
    pub max_text_chars: Option<u32>,
}

impl OutputControls {
    /// Render data according to output controls.
    pub fn emit<T: Serialize>(&self, data: &T) -> String {
        let value = serde_json::to_value(data).unwrap_or(json!(null));

        let truncated = match self.max_text_chars {
            Some(max_chars) => truncate_text_fields(&value, max_chars as usize),
            None => value,
        };

        if self.compact {
            serde_json::to_string(&truncated).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string_pretty(&truncated).unwrap_or_else(|_| "{}".to_string())
        }
    }

    /// Print data to stdout according to output controls.
    pub fn print<T: Serialize>(&self, data: &T) {
        println!("{}", self.emit(data));
    }

    /// Shorten a single string for human output.
    pub fn clip(&self, s: &str) -> String {
        match self.max_text_chars {
            Some(max_chars) => truncate(s, max_chars as usize),
            None => s.to_string(),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

/// Truncate string fields in JSON value.
fn truncate_text_fields(value: &Value, max_chars: usize) -> Value {
    match value {
        Value::String(s) => Value::String(truncate(s, max_chars)),
        Value::Array(arr) => {
            Value::Array(arr.iter().map(|v| truncate_text_fields(v, max_chars)).collect())
        }
        Value::Object(map) => {
            let mut truncated = serde_json::Map::new();
            for (k, v) in map {
                truncated.insert(k.clone(), truncate_text_fields(v, max_chars));
            }
            Value::Object(truncated)
        }
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_emit() {
        let controls = OutputControls {
            compact: true,
            ..Default::default()
        };
        assert_eq!(controls.emit(&json!({"ok": true})), r#"{"ok":true}"#);
    }

    #[test]
    fn test_truncation_is_char_safe() {
        let controls = OutputControls {
            compact: true,
            max_text_chars: Some(3),
            ..Default::default()
        };
        assert_eq!(controls.emit(&json!({"t": "héllo"})), r#"{"t":"hél..."}"#);
        assert_eq!(controls.clip("ab"), "ab");
    }

    #[test]
    fn test_nested_truncation() {
        let value = json!({"items": [{"text": "abcdef"}], "n": 5});
        let out = truncate_text_fields(&value, 2);
        assert_eq!(out, json!({"items": [{"text": "ab..."}], "n": 5}));
    }
}
