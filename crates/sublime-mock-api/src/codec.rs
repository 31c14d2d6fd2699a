//! `encode_value`, `decode_value` and `expand_variables`.
//!
//! Values are JSON. Decoding follows the host's permissive contract: bad
//! input yields `("", 1)` instead of an error.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

/// Status returned by [`decode_value`] for well-formed input.
pub const DECODE_OK: i64 = 0;
/// Status returned by [`decode_value`] for malformed input.
pub const DECODE_MALFORMED: i64 = 1;

/// Serialize `value` as compact JSON, or with a four-space indent when
/// `pretty` is set.
#[must_use]
pub fn encode_value(value: &Value, pretty: bool) -> String {
    if !pretty {
        return value.to_string();
    }

    let mut buf = Vec::new();
    let written = {
        let mut ser = serde_json::Serializer::with_formatter(
            &mut buf,
            PrettyFormatter::with_indent(b"    "),
        );
        value.serialize(&mut ser).is_ok()
    };
    if !written {
        return value.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| value.to_string())
}

/// Parse JSON text. Returns `(value, 0)` on success and `("", 1)` otherwise.
#[must_use]
pub fn decode_value(text: &str) -> (Value, i64) {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => (value, DECODE_OK),
        Err(_) => (Value::String(String::new()), DECODE_MALFORMED),
    }
}

/// Errors from [`expand_variables`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpandError {
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("invalid placeholder at byte offset {offset}")]
    InvalidPlaceholder { offset: usize },
}

/// Substitute `$name` / `${name}` placeholders from `variables`.
///
/// Strings are expanded, arrays and objects recursively, every other value
/// is returned unchanged. `$$` produces a literal `$`. Non-string variable
/// values are inserted as their JSON text.
pub fn expand_variables(value: &Value, variables: &Map<String, Value>) -> Result<Value, ExpandError> {
    match value {
        Value::String(template) => expand_str(template, variables).map(Value::String),
        Value::Array(items) => items
            .iter()
            .map(|item| expand_variables(item, variables))
            .collect::<Result<Vec<_>, ExpandError>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| -> Result<(String, Value), ExpandError> {
                Ok((key.clone(), expand_variables(item, variables)?))
            })
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
        other => Ok(other.clone()),
    }
}

fn expand_str(template: &str, variables: &Map<String, Value>) -> Result<String, ExpandError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let at = offset + pos;
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
            offset = at + 2;
            continue;
        }

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            let len = identifier_len(braced);
            if len == 0 || !braced[len..].starts_with('}') {
                return Err(ExpandError::InvalidPlaceholder { offset: at });
            }
            (&braced[..len], len + 2)
        } else {
            let len = identifier_len(after);
            if len == 0 {
                return Err(ExpandError::InvalidPlaceholder { offset: at });
            }
            (&after[..len], len)
        };

        let replacement = variables
            .get(name)
            .ok_or_else(|| ExpandError::UndefinedVariable(name.to_string()))?;
        match replacement {
            Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }

        rest = &after[consumed..];
        offset = at + 1 + consumed;
    }

    out.push_str(rest);
    Ok(out)
}

/// Byte length of the ASCII identifier (`[_A-Za-z][_A-Za-z0-9]*`) at the
/// start of `s`.
fn identifier_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if *b == b'_' || b.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| **b == b'_' || b.is_ascii_alphanumeric())
        .count()
}
