//! Diff rendering for mismatched values.

use serde_json::Value;
use sublime_mock_api::encode_value;

/// Render a line diff between reference and shadow text.
#[must_use]
pub fn render_diff(reference: &str, shadow: &str) -> String {
    if reference == shadow {
        return String::from("[identical]");
    }

    let mut out = String::new();
    out.push_str("--- reference\n");
    out.push_str("+++ shadow\n");
    let ref_lines: Vec<&str> = reference.lines().collect();
    let shadow_lines: Vec<&str> = shadow.lines().collect();
    for i in 0..ref_lines.len().max(shadow_lines.len()) {
        let (r, s) = (ref_lines.get(i), shadow_lines.get(i));
        if r == s {
            continue;
        }
        out.push_str(&format!("@@ line {} @@\n", i + 1));
        if let Some(r) = r {
            out.push_str(&format!("-{r}\n"));
        }
        if let Some(s) = s {
            out.push_str(&format!("+{s}\n"));
        }
    }
    out
}

/// Describe a value mismatch. Scalars stay on one line; structured values
/// get a line diff of their pretty JSON.
#[must_use]
pub fn render_value_diff(reference: &Value, shadow: &Value) -> String {
    let structured = |v: &Value| v.is_array() || v.is_object();
    if !structured(reference) && !structured(shadow) {
        return format!("reference={reference}, shadow={shadow}");
    }
    render_diff(&encode_value(reference, true), &encode_value(shadow, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_text() {
        assert_eq!(render_diff("a\nb", "a\nb"), "[identical]");
    }

    #[test]
    fn changed_and_extra_lines() {
        let out = render_diff("a\nb", "a\nc\nd");
        assert!(out.contains("@@ line 2 @@\n-b\n+c\n"));
        assert!(out.contains("@@ line 3 @@\n+d\n"));
        assert!(!out.contains("line 1"));
    }

    #[test]
    fn scalar_values_render_inline() {
        assert_eq!(
            render_value_diff(&json!("4000"), &json!("3207")),
            r#"reference="4000", shadow="3207""#
        );
    }

    #[test]
    fn structured_values_render_line_diff() {
        let out = render_value_diff(&json!({"a": 1}), &json!({"a": 2}));
        assert!(out.starts_with("--- reference\n+++ shadow\n"));
        assert!(out.contains("-    \"a\": 1"));
        assert!(out.contains("+    \"a\": 2"));
    }
}
