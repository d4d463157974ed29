//! Validate raw JSON input against a skill's input schema.
//!
//! Validation never coerces between primitive types (`"100"` is not a
//! number). Missing fields with a declared default receive it, and keys the
//! schema does not declare are dropped from the validated payload.

use std::collections::HashSet;

use abacus_types::error::EngineError;
use abacus_types::schema::{SchemaNode, json_type_name};
use serde_json::{Map, Value};

/// Check `raw` against `schema` and return the normalized input.
///
/// A `null` payload is treated as an empty object. Every problem found is
/// reported in a single [`EngineError::Validation`].
pub fn validate_input(schema: &SchemaNode, raw: &Value) -> Result<Value, EngineError> {
    let empty = Value::Object(Map::new());
    let raw = if raw.is_null() { &empty } else { raw };

    let mut issues = Vec::new();
    let validated = check(schema, Some(raw), "", &mut issues);

    if issues.is_empty() {
        Ok(validated.unwrap_or(empty))
    } else {
        Err(EngineError::Validation(issues.join("; ")))
    }
}

/// Structural sanity check run when a descriptor is registered.
///
/// The root must be an object, property names must be unique at every level,
/// numeric bounds must be ordered, and declared defaults must satisfy the
/// node they decorate.
pub fn check_schema(schema: &SchemaNode) -> Result<(), String> {
    if schema.properties().is_none() {
        return Err(format!(
            "root must be an object, found {}",
            schema.type_name()
        ));
    }
    check_node(schema, "input")
}

fn check_node(node: &SchemaNode, path: &str) -> Result<(), String> {
    match node {
        SchemaNode::Optional { inner }
        | SchemaNode::Nullable { inner }
        | SchemaNode::Described { inner, .. } => check_node(inner, path),
        SchemaNode::Default { inner, value } => {
            let mut issues = Vec::new();
            check(inner, Some(value), path, &mut issues);
            if let Some(first) = issues.into_iter().next() {
                return Err(format!("default value rejected: {first}"));
            }
            check_node(inner, path)
        }
        SchemaNode::Number {
            min: Some(lo),
            max: Some(hi),
            ..
        } if lo > hi => Err(format!("{path}: minimum {lo} exceeds maximum {hi}")),
        SchemaNode::Object { properties } => {
            let mut seen = HashSet::new();
            for prop in properties {
                if prop.name.is_empty() {
                    return Err(format!("{path}: empty property name"));
                }
                if !seen.insert(prop.name.as_str()) {
                    return Err(format!("{path}: duplicate property '{}'", prop.name));
                }
                check_node(&prop.schema, &join(path, &prop.name))?;
            }
            Ok(())
        }
        SchemaNode::Array { items } => check_node(items, &format!("{path}[]")),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Recursive checker
// ---------------------------------------------------------------------------

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn label(path: &str) -> &str {
    if path.is_empty() { "input" } else { path }
}

/// Returns the validated value, or `None` when an optional field is absent.
fn check(
    node: &SchemaNode,
    value: Option<&Value>,
    path: &str,
    issues: &mut Vec<String>,
) -> Option<Value> {
    match node {
        SchemaNode::Described { inner, .. } => check(inner, value, path, issues),
        SchemaNode::Optional { inner } => match value {
            None => None,
            Some(_) => check(inner, value, path, issues),
        },
        SchemaNode::Nullable { inner } => match value {
            Some(Value::Null) => Some(Value::Null),
            _ => check(inner, value, path, issues),
        },
        SchemaNode::Default { inner, value: fallback } => match value {
            None => Some(fallback.clone()),
            Some(_) => check(inner, value, path, issues),
        },
        base => {
            let Some(value) = value else {
                issues.push(format!("{}: required", label(path)));
                return None;
            };
            check_base(base, value, path, issues)
        }
    }
}

fn check_base(
    node: &SchemaNode,
    value: &Value,
    path: &str,
    issues: &mut Vec<String>,
) -> Option<Value> {
    let mismatch = |issues: &mut Vec<String>| {
        issues.push(format!(
            "{}: expected {}, got {}",
            label(path),
            node.type_name(),
            json_type_name(value)
        ));
        None
    };

    match node {
        SchemaNode::Number { min, max, integer } => {
            let Some(n) = value.as_f64() else {
                return mismatch(issues);
            };
            if *integer && n.fract() != 0.0 {
                return mismatch(issues);
            }
            if let Some(lo) = min.filter(|lo| n < *lo) {
                issues.push(format!("{}: must be >= {lo}, got {n}", label(path)));
                return None;
            }
            if let Some(hi) = max.filter(|hi| n > *hi) {
                issues.push(format!("{}: must be <= {hi}, got {n}", label(path)));
                return None;
            }
            Some(value.clone())
        }
        SchemaNode::Boolean => match value {
            Value::Bool(_) => Some(value.clone()),
            _ => mismatch(issues),
        },
        SchemaNode::String => match value {
            Value::String(_) => Some(value.clone()),
            _ => mismatch(issues),
        },
        SchemaNode::Object { properties } => {
            let Value::Object(map) = value else {
                return mismatch(issues);
            };
            let mut out = Map::new();
            for prop in properties {
                let child = join(path, &prop.name);
                if let Some(v) = check(&prop.schema, map.get(&prop.name), &child, issues) {
                    out.insert(prop.name.clone(), v);
                }
            }
            Some(Value::Object(out))
        }
        SchemaNode::Array { items } => {
            let Value::Array(elements) = value else {
                return mismatch(issues);
            };
            let out = elements
                .iter()
                .enumerate()
                .filter_map(|(i, v)| check(items, Some(v), &format!("{}[{i}]", label(path)), issues))
                .collect();
            Some(Value::Array(out))
        }
        // Modifiers are peeled in `check`.
        _ => Some(value.clone()),
    }
}
