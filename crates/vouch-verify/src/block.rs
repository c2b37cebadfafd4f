//! Partial structural comparison of one response section
//!
//! Only the key paths named in the expectation are checked. A `null`
//! expected value asserts presence only. Every key is checked even when
//! earlier ones fail.

use serde_json::Value;
use tracing::debug;

use vouch_core::spec::strip_ext;
use vouch_core::template::{PlaceholderResolver, Variables};
use vouch_core::matching::mismatch_pair;
use vouch_core::{ErrorCollector, Expectation, KeyPath, SectionKind, values_match};

/// Collaborators needed to turn an expectation into concrete values.
#[derive(Clone, Copy)]
pub struct Templating<'a> {
    pub placeholders: &'a dyn PlaceholderResolver,
    pub variables: &'a Variables,
}

/// Check `actual` against the expected block for one section.
///
/// `expected` may still carry a `$ext` key; it is ignored here.
pub fn validate_block(
    kind: SectionKind,
    actual: Option<&Value>,
    expected: Option<&Value>,
    templating: Templating<'_>,
    errors: &mut ErrorCollector,
) {
    let Some(expected) = expected.cloned().and_then(strip_ext) else {
        debug!(section = %kind, "Nothing to validate");
        return;
    };

    debug!(section = %kind, expected = %expected, "Validating");

    let formatted = match templating
        .placeholders
        .resolve_placeholders(&expected, templating.variables)
    {
        Ok(v) => v,
        Err(e) => {
            errors.add_fault(format!("Could not format expected {kind}: {e}"), &e);
            return;
        }
    };

    let Some(actual) = actual else {
        errors.add(format!(
            "Expected {expected} in the {kind}, but there was no response body"
        ));
        return;
    };

    for (path, expected_val) in key_values(formatted) {
        let actual_val = match path.resolve(actual, kind.key_match()) {
            Ok(v) => v,
            Err(e) => {
                errors.add_fault(format!("Key not present: {path}"), &e);
                continue;
            }
        };

        debug!(key = %path, expected = %expected_val, actual = %actual_val, "Comparing");

        match Expectation::from_expected(expected_val) {
            Expectation::Present => debug!(key = %path, "Key was present"),
            Expectation::Equals(expected_val) => {
                if !values_match(actual_val, &expected_val) {
                    let (shown_actual, shown_expected) = mismatch_pair(actual_val, &expected_val);
                    errors.add(format!(
                        "Value mismatch: '{shown_actual}' vs '{shown_expected}'"
                    ));
                }
            }
        }
    }
}

/// Expected key paths with their values.
///
/// Mappings yield dotted keys, sequences yield positions. A scalar
/// expectation is compared against the whole section under an empty path.
fn key_values(expected: Value) -> Vec<(KeyPath, Value)> {
    match expected {
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| (KeyPath::parse(&k), v))
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (KeyPath::index(i), v))
            .collect(),
        scalar => vec![(KeyPath::root(), scalar)],
    }
}
