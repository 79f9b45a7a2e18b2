//! Declared parameters and call-time arguments.
//!
//! A [`Signature`] describes the parameter list of an instrumented function;
//! [`CallArgs`] captures what one call actually passed. Binding the two into a
//! name -> value mapping is pure and independent of any reporting.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::core::resolve::ResolveError;

/// How a declared parameter accepts arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Bound by position or by name.
    Regular,
    /// Catch-all for extra positional arguments.
    VarPositional,
    /// Catch-all for extra keyword arguments.
    VarKeyword,
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Value>,
    pub kind: ParamKind,
}

impl Param {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            kind: ParamKind::Regular,
        }
    }

    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
            kind: ParamKind::Regular,
        }
    }

    pub fn var_positional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            kind: ParamKind::VarPositional,
        }
    }

    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            kind: ParamKind::VarKeyword,
        }
    }
}

/// Ordered parameter list of an instrumented function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new(params: Vec<Param>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Reject parameter lists that cannot be bound unambiguously.
    ///
    /// Variadic catch-alls have no defined name mapping and duplicate names
    /// would make positional binding depend on declaration order.
    pub fn validate(&self) -> Result<(), ResolveError> {
        let mut seen = BTreeSet::new();
        for param in &self.params {
            if param.kind != ParamKind::Regular {
                return Err(ResolveError::VariadicParameter {
                    name: param.name.clone(),
                });
            }
            if !seen.insert(param.name.as_str()) {
                return Err(ResolveError::DuplicateParameter {
                    name: param.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Positional and keyword arguments of a single call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Set a keyword argument from any serializable value.
    pub fn kwarg_serialized<T: Serialize>(
        self,
        name: impl Into<String>,
        value: &T,
    ) -> serde_json::Result<Self> {
        let value = serde_json::to_value(value)?;
        Ok(self.kwarg(name, value))
    }

    /// Look up an argument by declared name: keyword first, then by position.
    pub fn get<'a>(&'a self, signature: &Signature, name: &str) -> Option<&'a Value> {
        if let Some(value) = self.keyword.get(name) {
            return Some(value);
        }
        let index = signature
            .params()
            .iter()
            .position(|param| param.name == name)?;
        self.positional.get(index)
    }
}

/// Merge a call's arguments into one name -> value mapping.
///
/// Positional arguments bind to declared names in order; keyword arguments are
/// merged second and win on conflict. Defaults are backfilled for absent
/// parameters only when the mapping holds fewer entries than declared
/// parameters.
pub fn bind_arguments(
    signature: &Signature,
    args: &CallArgs,
) -> Result<BTreeMap<String, Value>, ResolveError> {
    signature.validate()?;
    let params = signature.params();
    if args.positional.len() > params.len() {
        return Err(ResolveError::TooManyPositional {
            declared: params.len(),
            got: args.positional.len(),
        });
    }

    let mut bound: BTreeMap<String, Value> = params
        .iter()
        .zip(&args.positional)
        .map(|(param, value)| (param.name.clone(), value.clone()))
        .collect();
    bound.extend(
        args.keyword
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );

    if bound.len() < params.len() {
        for param in params {
            if let Some(default) = &param.default {
                bound
                    .entry(param.name.clone())
                    .or_insert_with(|| default.clone());
            }
        }
    }

    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fetch_signature() -> Signature {
        Signature::new(vec![Param::required("url"), Param::optional("retries", 3)])
    }

    #[test]
    fn positional_arguments_bind_in_declaration_order() {
        let args = CallArgs::new().arg("http://x").arg(5);
        let bound = bind_arguments(&fetch_signature(), &args).expect("bind");
        assert_eq!(bound.get("url"), Some(&json!("http://x")));
        assert_eq!(bound.get("retries"), Some(&json!(5)));
    }

    #[test]
    fn keyword_wins_over_positional() {
        let args = CallArgs::new().arg("http://positional").kwarg("url", "http://keyword");
        let bound = bind_arguments(&fetch_signature(), &args).expect("bind");
        assert_eq!(bound.get("url"), Some(&json!("http://keyword")));
    }

    #[test]
    fn defaults_fill_absent_parameters_only() {
        let args = CallArgs::new().arg("http://x");
        let bound = bind_arguments(&fetch_signature(), &args).expect("bind");
        assert_eq!(bound.get("retries"), Some(&json!(3)));

        let args = CallArgs::new().kwarg("retries", 9);
        let bound = bind_arguments(&fetch_signature(), &args).expect("bind");
        assert_eq!(bound.get("retries"), Some(&json!(9)));
        assert!(!bound.contains_key("url"));
    }

    #[test]
    fn backfill_skipped_when_mapping_is_full() {
        let signature = Signature::new(vec![Param::optional("a", 1), Param::optional("b", 2)]);
        // Extra keyword arguments count towards the populated size.
        let args = CallArgs::new().kwarg("a", 10).kwarg("extra", 0);
        let bound = bind_arguments(&signature, &args).expect("bind");
        assert!(!bound.contains_key("b"));
    }

    #[test]
    fn too_many_positional_arguments_fail() {
        let args = CallArgs::new().arg(1).arg(2).arg(3);
        let err = bind_arguments(&fetch_signature(), &args).expect_err("too many");
        assert_eq!(
            err,
            ResolveError::TooManyPositional {
                declared: 2,
                got: 3
            }
        );
    }

    #[test]
    fn variadic_parameters_are_rejected() {
        let signature = Signature::new(vec![Param::required("a"), Param::var_positional("rest")]);
        let err = bind_arguments(&signature, &CallArgs::new()).expect_err("variadic");
        assert_eq!(
            err,
            ResolveError::VariadicParameter {
                name: "rest".to_string()
            }
        );

        let signature = Signature::new(vec![Param::var_keyword("options")]);
        assert!(signature.validate().is_err());
    }

    #[test]
    fn duplicate_parameter_names_are_rejected() {
        let signature = Signature::new(vec![Param::required("a"), Param::optional("a", 1)]);
        assert_eq!(
            signature.validate(),
            Err(ResolveError::DuplicateParameter {
                name: "a".to_string()
            })
        );
    }

    #[test]
    fn get_prefers_keyword_then_position() {
        let signature = fetch_signature();
        let args = CallArgs::new().arg("http://x");
        assert_eq!(args.get(&signature, "url"), Some(&json!("http://x")));
        assert_eq!(args.get(&signature, "retries"), None);

        let args = CallArgs::new().kwarg("retries", 1);
        assert_eq!(args.get(&signature, "retries"), Some(&json!(1)));
    }

    #[test]
    fn kwarg_serialized_converts_structs() {
        #[derive(Serialize)]
        struct User {
            name: String,
        }
        let args = CallArgs::new()
            .kwarg_serialized(
                "user",
                &User {
                    name: "alice".to_string(),
                },
            )
            .expect("serialize");
        assert_eq!(args.keyword.get("user"), Some(&json!({"name": "alice"})));
    }
}
