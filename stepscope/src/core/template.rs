//! Placeholder scanning and substitution for step-name templates.
//!
//! Placeholders are `{body}` slots matched by a non-greedy, single-line scan.
//! There is no escaping: braces that do not form a placeholder pass through.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(.+?)\}").unwrap());

/// Placeholder bodies in first-occurrence order, duplicates removed.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut bodies: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let body = &caps[1];
        if !bodies.iter().any(|seen| seen == body) {
            bodies.push(body.to_string());
        }
    }
    bodies
}

/// Binding key for a placeholder body (`a.b.c` -> `a_b_c`).
pub fn placeholder_key(body: &str) -> String {
    body.replace('.', "_")
}

/// Rewrite every `{body}` placeholder in `template` to `{key}`.
pub fn rewrite_placeholder(template: &str, body: &str, key: &str) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            if &caps[1] == body {
                format!("{{{key}}}")
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Substitute placeholders from `bindings`.
///
/// Returns the first placeholder key without a binding on failure.
pub fn substitute(template: &str, bindings: &BTreeMap<String, Value>) -> Result<String, String> {
    let mut missing: Option<String> = None;
    let rendered = PLACEHOLDER_RE.replace_all(template, |caps: &Captures<'_>| {
        match bindings.get(&caps[1]) {
            Some(value) => render_value(value),
            None => {
                if missing.is_none() {
                    missing = Some(caps[1].to_string());
                }
                String::new()
            }
        }
    });
    let rendered = rendered.into_owned();
    match missing {
        Some(key) => Err(key),
        None => Ok(rendered),
    }
}

/// Render an argument value for display in a step label.
///
/// Strings render without quotes; every other value, `null` and booleans
/// included, uses its compact JSON form.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholders_keep_first_occurrence_order() {
        let bodies = placeholders("{b} then {a.x} then {b} and {c}");
        assert_eq!(bodies, vec!["b", "a.x", "c"]);
    }

    #[test]
    fn placeholders_scan_is_non_greedy_and_single_line() {
        assert_eq!(placeholders("{a}{b}"), vec!["a", "b"]);
        assert!(placeholders("{a\n}").is_empty());
        assert!(placeholders("{}").is_empty());
    }

    #[test]
    fn rewrite_only_touches_placeholders() {
        let rewritten = rewrite_placeholder("user.name={user.name}", "user.name", "user_name");
        assert_eq!(rewritten, "user.name={user_name}");
    }

    #[test]
    fn substitute_reports_first_missing_key() {
        let bindings = BTreeMap::from([("a".to_string(), json!(1))]);
        assert_eq!(substitute("{a} {b} {c}", &bindings), Err("b".to_string()));
    }

    #[test]
    fn render_value_formats_scalars_and_composites() {
        assert_eq!(render_value(&json!("x")), "x");
        assert_eq!(render_value(&json!(null)), "null");
        assert_eq!(render_value(&json!(3)), "3");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&json!(false)), "false");
        assert_eq!(render_value(&json!({"a": null})), "{\"a\":null}");
        assert_eq!(render_value(&json!([1, "a"])), "[1,\"a\"]");
    }
}
