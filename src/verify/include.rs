//! Partial structural inclusion
//!
//! `included(expected, actual)` holds when `expected` is a structural
//! subset of `actual`:
//!
//! - mappings: every expected key is present in `actual` and its value is
//!   itself included; extra keys in `actual` are ignored
//! - sequences: every expected element is a member of `actual`, in any
//!   order
//! - scalars: exact equality
//!
//! Values of different kinds never include one another. The relation is
//! not symmetric: `{}` is included in everything that is a mapping.

use serde_json::Value;
use std::fmt;

/// First place where `expected` is not included in `actual`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Location of the mismatch, e.g. `$.data.items`
    pub path: String,
    /// What went wrong at `path`
    pub reason: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}: {}", self.path, self.reason)
    }
}

/// Whether `expected` is included in `actual`
pub fn included(expected: &Value, actual: &Value) -> bool {
    mismatch(expected, actual).is_none()
}

/// Find the first mismatch between `expected` and `actual`
///
/// Keys are visited in the order of `expected`.
pub fn mismatch(expected: &Value, actual: &Value) -> Option<Mismatch> {
    let mut path = String::from("$");
    find(expected, actual, &mut path)
}

fn find(expected: &Value, actual: &Value, path: &mut String) -> Option<Mismatch> {
    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => {
            for (key, exp_value) in exp {
                let len = path.len();
                path.push('.');
                path.push_str(key);

                let found = match act.get(key) {
                    Some(act_value) => find(exp_value, act_value, path),
                    None => Some(Mismatch {
                        path: path.clone(),
                        reason: format!("missing, expected {}", exp_value),
                    }),
                };

                path.truncate(len);
                if found.is_some() {
                    return found;
                }
            }
            None
        }
        (Value::Array(exp), Value::Array(act)) => exp
            .iter()
            .find(|item| !act.contains(item))
            .map(|item| Mismatch {
                path: path.clone(),
                reason: format!("missing element {}", item),
            }),
        _ if kind_of(expected) != kind_of(actual) => Some(Mismatch {
            path: path.clone(),
            reason: format!(
                "expected {} {}, actually {} {}",
                kind_of(expected),
                expected,
                kind_of(actual),
                actual
            ),
        }),
        _ if expected != actual => Some(Mismatch {
            path: path.clone(),
            reason: format!("expected {}, actually {}", expected, actual),
        }),
        _ => None,
    }
}

/// Name of the kind of a JSON value
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
