//! Step-name resolution from call-time arguments.
//!
//! Resolution runs in a fixed order: scan placeholders, bind arguments
//! (positional, keyword, defaults), resolve dotted placeholders into
//! underscore keys, prune bindings to referenced keys, substitute.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::core::args::{CallArgs, Signature, bind_arguments};
use crate::core::path::resolve_path;
use crate::core::template::{placeholder_key, placeholders, rewrite_placeholder, substitute};

/// Substituted for a dotted placeholder whose field lookup failed.
pub const LOOKUP_FAILURE_SENTINEL: &str = "Internal Error";

/// Failure to derive a step label. Always raised before the step body runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("placeholder '{{{placeholder}}}' refers to unknown parameter '{base}'")]
    MissingParameter { placeholder: String, base: String },

    #[error(
        "parameter '{key}' from placeholder '{{{placeholder}}}' cannot be evaluated, \
         a similar variable is already defined"
    )]
    AmbiguousParameter { key: String, placeholder: String },

    #[error("placeholder '{{{key}}}' has no value")]
    UnresolvedPlaceholder { key: String },

    #[error("variadic parameter '{name}' cannot be bound to a step name")]
    VariadicParameter { name: String },

    #[error("{got} positional arguments given but {declared} parameters declared")]
    TooManyPositional { declared: usize, got: usize },

    #[error("parameter '{name}' is declared more than once")]
    DuplicateParameter { name: String },
}

/// Resolve `template` against the arguments of one call.
pub fn resolve_name(
    template: &str,
    signature: &Signature,
    args: &CallArgs,
) -> Result<String, ResolveError> {
    let mut required = placeholders(template);
    let mut bindings = bind_arguments(signature, args)?;
    let argument_keys: BTreeSet<String> = bindings.keys().cloned().collect();
    let mut rewritten = template.to_string();
    let mut dotted_keys: BTreeSet<String> = BTreeSet::new();

    for body in &mut required {
        if bindings.contains_key(body.as_str()) || !body.contains('.') {
            continue;
        }

        let segments: Vec<&str> = body.split('.').collect();
        let Some(base) = bindings.get(segments[0]) else {
            return Err(ResolveError::MissingParameter {
                placeholder: body.clone(),
                base: segments[0].to_string(),
            });
        };
        let value = match resolve_path(base, &segments[1..]) {
            Ok(value) => value,
            Err(err) => {
                warn!(placeholder = %body, error = %err, "step name lookup failed");
                Value::String(LOOKUP_FAILURE_SENTINEL.to_string())
            }
        };

        let key = placeholder_key(body);
        // Two distinct dotted paths may also collapse onto one key (`a.b_c`, `a_b.c`).
        if argument_keys.contains(&key) || !dotted_keys.insert(key.clone()) {
            return Err(ResolveError::AmbiguousParameter {
                key,
                placeholder: body.clone(),
            });
        }

        rewritten = rewrite_placeholder(&rewritten, body, &key);
        bindings.insert(key.clone(), value);
        *body = key;
    }

    let bindings: BTreeMap<String, Value> = bindings
        .into_iter()
        .filter(|(key, _)| required.contains(key))
        .collect();

    substitute(&rewritten, &bindings).map_err(|key| ResolveError::UnresolvedPlaceholder { key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::args::Param;
    use serde_json::json;

    fn user_signature() -> Signature {
        Signature::new(vec![Param::required("user")])
    }

    #[test]
    fn template_without_placeholders_is_verbatim() {
        let signature = Signature::new(vec![Param::required("a")]);
        let args = CallArgs::new().arg(1).kwarg("unrelated", "x");
        let label = resolve_name("Open the settings page", &signature, &args).expect("resolve");
        assert_eq!(label, "Open the settings page");
    }

    #[test]
    fn positional_argument_and_default_backfill() {
        let signature = Signature::new(vec![Param::required("url"), Param::optional("retries", 3)]);
        let args = CallArgs::new().arg("http://x");
        assert_eq!(
            resolve_name("Fetch {url}", &signature, &args).expect("resolve"),
            "Fetch http://x"
        );
        assert_eq!(
            resolve_name("Fetch {url} ({retries} tries)", &signature, &args).expect("resolve"),
            "Fetch http://x (3 tries)"
        );
    }

    #[test]
    fn explicit_value_wins_over_default() {
        let signature = Signature::new(vec![Param::required("url"), Param::optional("retries", 3)]);
        let args = CallArgs::new().arg("http://x").arg(7);
        assert_eq!(
            resolve_name("{retries}", &signature, &args).expect("resolve"),
            "7"
        );
    }

    #[test]
    fn dotted_placeholder_reads_fields() {
        let args = CallArgs::new().kwarg("user", json!({"name": "alice"}));
        let label = resolve_name("Login as {user.name}", &user_signature(), &args).expect("resolve");
        assert_eq!(label, "Login as alice");
    }

    #[test]
    fn deep_dotted_placeholder_reads_nested_fields() {
        let args = CallArgs::new().arg(json!({"profile": {"address": {"city": "Oslo"}}}));
        let label =
            resolve_name("Ship to {user.profile.address.city}", &user_signature(), &args)
                .expect("resolve");
        assert_eq!(label, "Ship to Oslo");
    }

    #[test]
    fn failed_lookup_substitutes_sentinel() {
        let args = CallArgs::new().kwarg("user", json!({}));
        let label = resolve_name("Login as {user.name}", &user_signature(), &args).expect("resolve");
        assert_eq!(label, "Login as Internal Error");

        let args = CallArgs::new().kwarg("user", json!({"id": 1}));
        let label =
            resolve_name("{user.name.first}", &user_signature(), &args).expect("resolve");
        assert_eq!(label, LOOKUP_FAILURE_SENTINEL);
    }

    #[test]
    fn repeated_dotted_placeholder_resolves_once() {
        let args = CallArgs::new().kwarg("user", json!({"name": "bob"}));
        let label =
            resolve_name("{user.name} is {user.name}", &user_signature(), &args).expect("resolve");
        assert_eq!(label, "bob is bob");
    }

    #[test]
    fn several_dotted_placeholders_are_all_rewritten() {
        let signature = Signature::new(vec![Param::required("src"), Param::required("dst")]);
        let args = CallArgs::new()
            .arg(json!({"path": "/a"}))
            .arg(json!({"path": "/b"}));
        let label =
            resolve_name("Copy {src.path} to {dst.path}", &signature, &args).expect("resolve");
        assert_eq!(label, "Copy /a to /b");
    }

    #[test]
    fn missing_base_parameter_fails() {
        let args = CallArgs::new().kwarg("user", json!({"name": "alice"}));
        let err = resolve_name("{account.name}", &user_signature(), &args).expect_err("missing");
        assert_eq!(
            err,
            ResolveError::MissingParameter {
                placeholder: "account.name".to_string(),
                base: "account".to_string(),
            }
        );
    }

    #[test]
    fn underscore_collision_with_argument_is_ambiguous() {
        let signature = Signature::new(vec![Param::required("user"), Param::required("user_name")]);
        let args = CallArgs::new().arg(json!({"name": "alice"})).arg("bob");
        let err = resolve_name("{user.name}", &signature, &args).expect_err("ambiguous");
        assert_eq!(
            err,
            ResolveError::AmbiguousParameter {
                key: "user_name".to_string(),
                placeholder: "user.name".to_string(),
            }
        );
    }

    #[test]
    fn distinct_dotted_paths_on_same_key_are_ambiguous() {
        let signature = Signature::new(vec![Param::required("a"), Param::required("a_b")]);
        let args = CallArgs::new()
            .arg(json!({"b_c": 1}))
            .arg(json!({"c": 2}));
        let err = resolve_name("{a.b_c} {a_b.c}", &signature, &args).expect_err("ambiguous");
        assert!(matches!(err, ResolveError::AmbiguousParameter { key, .. } if key == "a_b_c"));
    }

    #[test]
    fn unresolved_placeholder_fails() {
        let args = CallArgs::new().kwarg("user", "alice");
        let err = resolve_name("{user} on {host}", &user_signature(), &args).expect_err("missing");
        assert_eq!(
            err,
            ResolveError::UnresolvedPlaceholder {
                key: "host".to_string()
            }
        );
    }

    #[test]
    fn extra_arguments_never_reach_formatting() {
        let signature = Signature::new(vec![Param::required("a"), Param::optional("b", 2)]);
        let args = CallArgs::new().arg(1).kwarg("noise", json!({"x": 1}));
        let label = resolve_name("only {a}", &signature, &args).expect("resolve");
        assert_eq!(label, "only 1");
    }

    #[test]
    fn error_messages_quote_placeholders() {
        let err = ResolveError::UnresolvedPlaceholder {
            key: "host".to_string(),
        };
        assert_eq!(err.to_string(), "placeholder '{host}' has no value");
    }
}
