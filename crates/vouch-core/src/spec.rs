//! Expected-response specification
//!
//! Built once per test stage from the parsed test document, then read-only.
//!
//! ```yaml
//! status_code: 201
//! body:
//!   id: ~            # must be present, any value
//!   name: alice
//!   $ext:
//!     function: checks:has_etag
//! headers:
//!   content-type: application/json
//! save:
//!   body:
//!     user_id: id
//!   redirect_query_params:
//!     token: t
//! ```

use indexmap::IndexMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::section::SectionKind;

/// Reserved key holding an extension-function reference.
pub const EXT_KEY: &str = "$ext";

/// Status code expected when none is given.
pub const DEFAULT_STATUS_CODE: u16 = 200;

const fn default_status_code() -> u16 {
    DEFAULT_STATUS_CODE
}

/// Everything a response must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedSpec {
    #[serde(default = "default_status_code")]
    pub status_code: u16,
    /// Expected body (mapping or sequence); may carry `$ext`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_query_params: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save: Option<SaveSpec>,
}

/// What to extract from a response, per section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveSpec {
    /// save-name → dotted key path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_query_params: Option<IndexMap<String, String>>,
    /// Custom save function
    #[serde(default, rename = "$ext", skip_serializing_if = "Option::is_none")]
    pub ext: Option<ExtSpec>,
}

impl SaveSpec {
    #[must_use]
    pub fn section(&self, kind: SectionKind) -> Option<&IndexMap<String, String>> {
        match kind {
            SectionKind::Body => self.body.as_ref(),
            SectionKind::Headers => self.headers.as_ref(),
            SectionKind::RedirectQueryParams => self.redirect_query_params.as_ref(),
        }
    }
}

/// DSL-level reference to an extension function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtSpec {
    /// `module:function`
    pub function: String,
    /// Keyword arguments bound to the call
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra_kwargs: Map<String, Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("Invalid expected response: {0}")]
    Invalid(String),
    #[error("Invalid $ext block in {section}: {reason}")]
    InvalidExt { section: String, reason: String },
}

impl ExpectedSpec {
    /// Build from a parsed document, filling defaults beneath it.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Invalid`] if the merged document does not have
    /// the expected shape.
    pub fn from_value(value: Value) -> Result<Self, SpecError> {
        let defaults = serde_json::json!({ "status_code": DEFAULT_STATUS_CODE });
        let merged = deep_merge(defaults, value);
        serde_json::from_value(merged).map_err(|e| SpecError::Invalid(e.to_string()))
    }

    /// The expected data for one section, with the `$ext` key removed.
    ///
    /// `None` when the section is absent, `null`, or empty.
    #[must_use]
    pub fn expected_section(&self, kind: SectionKind) -> Option<Value> {
        self.raw_section(kind).and_then(strip_ext)
    }

    /// The expected data for one section exactly as written.
    #[must_use]
    pub fn raw_section(&self, kind: SectionKind) -> Option<Value> {
        match kind {
            SectionKind::Body => self.body.clone(),
            SectionKind::Headers => self.headers.clone().map(Value::Object),
            SectionKind::RedirectQueryParams => {
                self.redirect_query_params.clone().map(Value::Object)
            }
        }
    }

    /// Save-spec entries for one section.
    #[must_use]
    pub fn save_section(&self, kind: SectionKind) -> Option<&IndexMap<String, String>> {
        self.save.as_ref().and_then(|s| s.section(kind))
    }

    /// Custom validator declared under `body.$ext`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::InvalidExt`] if the block is malformed.
    pub fn body_ext(&self) -> Result<Option<ExtSpec>, SpecError> {
        let Some(raw) = self.body.as_ref().and_then(|b| b.get(EXT_KEY)) else {
            return Ok(None);
        };
        serde_json::from_value(raw.clone())
            .map(Some)
            .map_err(|e| SpecError::InvalidExt {
                section: SectionKind::Body.to_string(),
                reason: e.to_string(),
            })
    }

    /// Custom saver declared under `save.$ext`.
    #[must_use]
    pub fn save_ext(&self) -> Option<&ExtSpec> {
        self.save.as_ref().and_then(|s| s.ext.as_ref())
    }
}

/// Drop the `$ext` key from a mapping block.
///
/// Returns `None` if nothing is left to compare: `null`, an empty
/// mapping, or an empty sequence.
#[must_use]
pub fn strip_ext(mut block: Value) -> Option<Value> {
    if let Value::Object(map) = &mut block {
        map.retain(|key, _| key != EXT_KEY);
    }
    let empty = match &block {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    };
    (!empty).then_some(block)
}

/// Recursively merge `overlay` onto `base`; overlay values win.
///
/// Only mappings merge key by key; any other overlay value replaces the
/// base value outright.
#[must_use]
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => *existing = deep_merge(std::mem::take(existing), value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_code_defaults_to_200() {
        let spec = ExpectedSpec::from_value(json!({})).unwrap();
        assert_eq!(spec.status_code, 200);
        assert!(spec.body.is_none());
    }

    #[test]
    fn explicit_status_code_wins() {
        let spec = ExpectedSpec::from_value(json!({"status_code": 404})).unwrap();
        assert_eq!(spec.status_code, 404);
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let err = ExpectedSpec::from_value(json!({"bodyy": {}})).unwrap_err();
        assert!(matches!(err, SpecError::Invalid(_)));
    }

    #[test]
    fn deep_merge_caller_values_win() {
        let merged = deep_merge(
            json!({"a": 1, "nested": {"x": 1, "y": 2}}),
            json!({"nested": {"y": 3}, "b": 4}),
        );
        assert_eq!(merged, json!({"a": 1, "b": 4, "nested": {"x": 1, "y": 3}}));
    }

    #[test]
    fn strip_ext_keeps_written_order() {
        let stripped = strip_ext(json!({"b": 1, "$ext": {"function": "m:f"}, "a": 2})).unwrap();
        let keys: Vec<&str> = stripped
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn deep_merge_non_mapping_replaces() {
        assert_eq!(deep_merge(json!({"a": 1}), json!([1])), json!([1]));
    }

    #[test]
    fn expected_section_strips_ext() {
        let spec = ExpectedSpec::from_value(json!({
            "body": {"name": "alice", "$ext": {"function": "m:f"}}
        }))
        .unwrap();
        assert_eq!(
            spec.expected_section(SectionKind::Body),
            Some(json!({"name": "alice"}))
        );
        // $ext is still there for the validator lookup
        assert_eq!(
            spec.body_ext().unwrap(),
            Some(ExtSpec {
                function: "m:f".into(),
                extra_kwargs: Map::new(),
            })
        );
    }

    #[test]
    fn ext_only_body_is_unconstrained() {
        let spec =
            ExpectedSpec::from_value(json!({"body": {"$ext": {"function": "m:f"}}})).unwrap();
        assert_eq!(spec.expected_section(SectionKind::Body), None);
    }

    #[test]
    fn empty_and_null_sections_are_absent() {
        let spec = ExpectedSpec::from_value(json!({"body": null, "headers": {}})).unwrap();
        assert_eq!(spec.expected_section(SectionKind::Body), None);
        assert_eq!(spec.expected_section(SectionKind::Headers), None);
        assert_eq!(spec.expected_section(SectionKind::RedirectQueryParams), None);
    }

    #[test]
    fn sequence_body_is_kept() {
        let spec = ExpectedSpec::from_value(json!({"body": [1, null]})).unwrap();
        assert_eq!(spec.expected_section(SectionKind::Body), Some(json!([1, null])));
    }

    #[test]
    fn save_spec_parses_sections_and_ext() {
        let spec = ExpectedSpec::from_value(json!({
            "save": {
                "body": {"user_id": "id"},
                "$ext": {"function": "m:save", "extra_kwargs": {"k": 1}}
            }
        }))
        .unwrap();
        assert_eq!(
            spec.save_section(SectionKind::Body).unwrap().get("user_id"),
            Some(&"id".to_string())
        );
        assert!(spec.save_section(SectionKind::Headers).is_none());
        let ext = spec.save_ext().unwrap();
        assert_eq!(ext.function, "m:save");
        assert_eq!(ext.extra_kwargs.get("k"), Some(&json!(1)));
    }

    #[test]
    fn malformed_body_ext_is_reported() {
        let spec = ExpectedSpec::from_value(json!({"body": {"$ext": "m:f"}})).unwrap();
        assert!(matches!(spec.body_ext(), Err(SpecError::InvalidExt { .. })));
    }
}
