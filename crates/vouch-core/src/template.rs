//! Placeholder substitution in expected values
//!
//! The verifier only depends on [`PlaceholderResolver`]. [`FormatKeys`] is
//! the built-in implementation: every string scalar has `{name}` replaced
//! by the variable `name`, `{a.b}` walks into nested variables, and `{{` /
//! `}}` produce literal braces. Substituted values are always rendered as
//! strings, so `"{user_id}"` with `user_id = 42` becomes `"42"`.

use serde_json::{Map, Value};

use crate::keypath::{KeyMatch, KeyPath, resolve};
use crate::matching::display_value;

/// Variables available to placeholders.
pub type Variables = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("missing variable '{0}'")]
    MissingVariable(String),
    #[error("unmatched brace in '{0}'")]
    UnmatchedBrace(String),
}

/// Resolves placeholders inside an expected structure.
///
/// Implementations must keep the shape of the input and only rewrite
/// placeholder scalars.
pub trait PlaceholderResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns [`FormatError`] when a placeholder cannot be resolved.
    fn resolve_placeholders(&self, structure: &Value, variables: &Variables)
    -> Result<Value, FormatError>;
}

/// `{name}` substitution over every string in a structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatKeys;

impl PlaceholderResolver for FormatKeys {
    fn resolve_placeholders(
        &self,
        structure: &Value,
        variables: &Variables,
    ) -> Result<Value, FormatError> {
        format_keys(structure, variables)
    }
}

/// Recursively format every string scalar in `structure`.
///
/// # Errors
///
/// Returns [`FormatError`] for unknown variables or unbalanced braces.
pub fn format_keys(structure: &Value, variables: &Variables) -> Result<Value, FormatError> {
    Ok(match structure {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), format_keys(v, variables)?)))
                .collect::<Result<Map<_, _>, FormatError>>()?,
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| format_keys(v, variables))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::String(s) => Value::String(format_str(s, variables)?),
        other => other.clone(),
    })
}

/// Format a single template string.
///
/// # Errors
///
/// Returns [`FormatError`] for unknown variables or unbalanced braces.
pub fn format_str(template: &str, variables: &Variables) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => return Err(FormatError::UnmatchedBrace(template.to_string())),
                    }
                }
                let value = lookup(&name, variables)
                    .ok_or_else(|| FormatError::MissingVariable(name.clone()))?;
                out.push_str(&display_value(value));
            }
            '}' => return Err(FormatError::UnmatchedBrace(template.to_string())),
            c => out.push(c),
        }
    }

    Ok(out)
}

fn lookup<'a>(name: &str, variables: &'a Variables) -> Option<&'a Value> {
    let path = KeyPath::parse(name);
    let (first, rest) = path.segments().split_first()?;
    let root = variables.get(first)?;
    resolve(root, rest, KeyMatch::Exact).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars() -> Variables {
        json!({
            "name": "alice",
            "user_id": 42,
            "tokens": {"access": "abc"}
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn substitutes_simple_and_nested_names() {
        assert_eq!(format_str("hi {name}", &vars()).unwrap(), "hi alice");
        assert_eq!(format_str("{tokens.access}", &vars()).unwrap(), "abc");
    }

    #[test]
    fn non_string_variables_render_as_text() {
        assert_eq!(format_str("{user_id}", &vars()).unwrap(), "42");
    }

    #[test]
    fn doubled_braces_are_literal() {
        assert_eq!(format_str("{{name}}", &vars()).unwrap(), "{name}");
    }

    #[test]
    fn missing_variable_and_bad_braces_fail() {
        assert_eq!(
            format_str("{nope}", &vars()),
            Err(FormatError::MissingVariable("nope".into()))
        );
        assert!(matches!(
            format_str("{name", &vars()),
            Err(FormatError::UnmatchedBrace(_))
        ));
        assert!(matches!(
            format_str("a}b", &vars()),
            Err(FormatError::UnmatchedBrace(_))
        ));
    }

    #[test]
    fn keeps_structure_shape() {
        let input = json!({"a": ["{name}", 1, null], "b": {"c": "{user_id}"}, "d": true});
        let out = FormatKeys.resolve_placeholders(&input, &vars()).unwrap();
        assert_eq!(out, json!({"a": ["alice", 1, null], "b": {"c": "42"}, "d": true}));
    }
}
