//! Expected-value variants and how they match actual data

use serde_json::Value;

/// What an expected key-path demands of the actual value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// Key must exist; its value is unconstrained
    Present,
    /// Actual value must equal this one
    Equals(Value),
}

impl Expectation {
    /// A top-level `null` is the presence sentinel; anything else is concrete.
    #[must_use]
    pub fn from_expected(value: Value) -> Self {
        match value {
            Value::Null => Self::Present,
            other => Self::Equals(other),
        }
    }

    #[must_use]
    pub fn matches(&self, actual: &Value) -> bool {
        match self {
            Self::Present => true,
            Self::Equals(expected) => values_match(actual, expected),
        }
    }
}

/// Structural equality with numeric comparison across integer/float.
#[must_use]
pub fn values_match(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => {
            if a == b {
                return true;
            }
            match (a.as_i64(), b.as_i64(), a.as_u64(), b.as_u64()) {
                (Some(x), Some(y), _, _) => x == y,
                (_, _, Some(x), Some(y)) => x == y,
                _ => match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                },
            }
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, av)| b.get(k).is_some_and(|bv| values_match(av, bv)))
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(av, bv)| values_match(av, bv))
        }
        _ => actual == expected,
    }
}

/// Render a value for an error line: strings raw, everything else as JSON.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render both sides of a mismatch.
///
/// Strings are shown raw unless the two values have different types, in
/// which case both are shown as JSON so `"1"` and `1` stay distinguishable.
#[must_use]
pub fn mismatch_pair(actual: &Value, expected: &Value) -> (String, String) {
    if std::mem::discriminant(actual) == std::mem::discriminant(expected) {
        (display_value(actual), display_value(expected))
    } else {
        (actual.to_string(), expected.to_string())
    }
}

/// Whether `value` counts as empty: `null`, `false`, zero, or an empty
/// string, sequence or mapping.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn null_becomes_presence_sentinel() {
        assert_eq!(Expectation::from_expected(Value::Null), Expectation::Present);
        assert_eq!(
            Expectation::from_expected(json!(0)),
            Expectation::Equals(json!(0))
        );
    }

    #[test]
    fn integer_and_float_compare_numerically() {
        assert!(values_match(&json!(1), &json!(1.0)));
        assert!(!values_match(&json!(1), &json!(1.5)));
    }

    #[test]
    fn nested_null_is_literal() {
        assert!(values_match(&json!({"a": null}), &json!({"a": null})));
        assert!(!values_match(&json!({"a": 1}), &json!({"a": null})));
    }

    #[test]
    fn mappings_need_same_keys() {
        assert!(!values_match(&json!({"a": 1, "b": 2}), &json!({"a": 1})));
        assert!(values_match(&json!({"a": [1, {"b": 2.0}]}), &json!({"a": [1, {"b": 2}]})));
    }

    #[test]
    fn string_never_equals_number() {
        assert!(!values_match(&json!("42"), &json!(42)));
    }

    #[test]
    fn display_value_shows_strings_raw() {
        assert_eq!(display_value(&json!("fail")), "fail");
        assert_eq!(display_value(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(display_value(&Value::Null), "null");
    }

    #[test]
    fn mismatch_of_different_types_is_shown_as_json() {
        assert_eq!(
            mismatch_pair(&json!("1"), &json!(1)),
            (r#""1""#.to_string(), "1".to_string())
        );
        assert_eq!(
            mismatch_pair(&json!("fail"), &json!("ok")),
            ("fail".to_string(), "ok".to_string())
        );
    }

    #[test]
    fn empty_values() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(is_empty_value(&v), "{v} should be empty");
        }
        for v in [json!(true), json!(-1), json!("0"), json!([0]), json!({"a": null})] {
            assert!(!is_empty_value(&v), "{v} should not be empty");
        }
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 16, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn presence_sentinel_matches_anything(actual in arb_json()) {
            prop_assert!(Expectation::Present.matches(&actual));
        }

        #[test]
        fn concrete_value_matches_itself(v in arb_json()) {
            prop_assert!(Expectation::Equals(v.clone()).matches(&v));
        }
    }
}
