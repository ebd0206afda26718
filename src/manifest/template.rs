//! Template expansion
//!
//! Supports the Jinja subset the manifest templates use:
//!
//! - `{{ path.to.value }}` substitutes a value from the template values,
//!   with numeric segments indexing into sequences (`backends.0.name`)
//! - `{# ... #}` is a comment and is dropped
//!
//! Anything else that looks like template syntax (`{% ... %}`, filters, an
//! unterminated `{{`) is rejected rather than passed through.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::common::{Error, Result};

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"(?s)\{\{(?P<expr>.*?)\}\}|\{#.*?#\}|\{%").expect("tag regex is valid")
    })
}

fn path_regex() -> &'static Regex {
    static PATH: OnceLock<Regex> = OnceLock::new();
    PATH.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*(\.[A-Za-z0-9_-]+)*$").expect("path regex is valid")
    })
}

/// Render template `source` against `values`
///
/// `identifier` only names the template in error messages.
pub fn render(identifier: &str, source: &str, values: &Value) -> Result<String> {
    let mut output = String::with_capacity(source.len());
    let mut last = 0;

    for caps in tag_regex().captures_iter(source) {
        let whole = caps.get(0).expect("capture 0 is the whole match");
        let literal = &source[last..whole.start()];
        check_literal(identifier, literal, line_of(source, last))?;
        output.push_str(literal);
        last = whole.end();

        let line = line_of(source, whole.start());
        if whole.as_str() == "{%" {
            return Err(Error::template(
                identifier,
                format!("line {}: statement blocks are not supported", line),
            ));
        }

        if let Some(expr) = caps.name("expr") {
            let path = expr.as_str().trim();
            output.push_str(&substitute(identifier, path, values, line)?);
        }
    }

    let rest = &source[last..];
    check_literal(identifier, rest, line_of(source, last))?;
    output.push_str(rest);

    Ok(output)
}

/// Literal text between tags must not open a tag it never closes
fn check_literal(identifier: &str, literal: &str, start_line: usize) -> Result<()> {
    for opener in ["{{", "{#"] {
        if let Some(pos) = literal.find(opener) {
            let line = start_line + literal[..pos].matches('\n').count();
            return Err(Error::template(
                identifier,
                format!("line {}: unterminated '{}'", line, opener),
            ));
        }
    }
    Ok(())
}

fn substitute(identifier: &str, path: &str, values: &Value, line: usize) -> Result<String> {
    if !path_regex().is_match(path) {
        return Err(Error::template(
            identifier,
            format!("line {}: unsupported expression '{}'", line, path),
        ));
    }

    let value = lookup(values, path).ok_or_else(|| {
        Error::template(
            identifier,
            format!("line {}: '{}' is undefined", line, path),
        )
    })?;

    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    })
}

/// Resolve a dotted path in `values`
pub fn lookup<'a>(values: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(values, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}
