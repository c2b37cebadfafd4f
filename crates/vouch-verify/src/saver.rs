//! Extraction of named values from a response section

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use vouch_core::{ErrorCollector, KeyPath, SectionKind, is_empty_value};

/// Extract `save-name → dotted path` entries from `actual`.
///
/// Missing paths are reported and left out; the remaining names still
/// resolve.
pub fn save_values(
    kind: SectionKind,
    actual: Option<&Value>,
    wanted: Option<&IndexMap<String, String>>,
    errors: &mut ErrorCollector,
) -> Map<String, Value> {
    let mut saved = Map::new();

    let Some(wanted) = wanted else {
        debug!(section = %kind, "Nothing expected to save");
        return saved;
    };

    let Some(actual) = actual.filter(|v| !is_empty_value(v)) else {
        errors.add(format!(
            "No {kind} in response (wanted to save {})",
            serde_json::to_string(wanted).unwrap_or_default()
        ));
        return saved;
    };

    for (save_as, joined_key) in wanted {
        let path = KeyPath::parse(joined_key);
        match path.resolve(actual, kind.key_match()) {
            Ok(value) => {
                saved.insert(save_as.clone(), value.clone());
            }
            Err(e) => errors.add_fault(
                format!(
                    "Wanted to save '{joined_key}' from '{kind}', but it did not exist in the response"
                ),
                &e,
            ),
        }
    }

    if !saved.is_empty() {
        let shown = Value::Object(saved.clone());
        debug!(section = %kind, saved = %shown, "Saved from response");
    }

    saved
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wanted(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn nothing_requested_is_not_an_error() {
        let mut errors = ErrorCollector::new();
        let saved = save_values(SectionKind::Body, None, None, &mut errors);
        assert!(saved.is_empty());
        assert!(!errors.has_errors());
    }

    #[test]
    fn saves_nested_values() {
        let mut errors = ErrorCollector::new();
        let body = json!({"id": 42, "user": {"tags": ["a", "b"]}});
        let saved = save_values(
            SectionKind::Body,
            Some(&body),
            Some(&wanted(&[("user_id", "id"), ("tag", "user.tags.1")])),
            &mut errors,
        );
        assert_eq!(Value::Object(saved), json!({"user_id": 42, "tag": "b"}));
        assert!(!errors.has_errors());
    }

    #[test]
    fn missing_path_does_not_block_others() {
        let mut errors = ErrorCollector::new();
        let body = json!({"id": 42});
        let saved = save_values(
            SectionKind::Body,
            Some(&body),
            Some(&wanted(&[("a_missing", "nope.deep"), ("user_id", "id")])),
            &mut errors,
        );
        assert_eq!(Value::Object(saved), json!({"user_id": 42}));
        assert_eq!(
            errors.messages(),
            ["Wanted to save 'nope.deep' from 'body', but it did not exist in the response"]
        );
    }

    #[test]
    fn empty_source_is_one_error() {
        let mut errors = ErrorCollector::new();
        let saved = save_values(
            SectionKind::Body,
            None,
            Some(&wanted(&[("user_id", "id")])),
            &mut errors,
        );
        assert!(saved.is_empty());
        assert_eq!(
            errors.messages(),
            [r#"No body in response (wanted to save {"user_id":"id"})"#]
        );

        let mut errors = ErrorCollector::new();
        save_values(
            SectionKind::Headers,
            Some(&json!({})),
            Some(&wanted(&[("etag", "etag")])),
            &mut errors,
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn falsy_body_counts_as_empty() {
        for body in [json!(0), json!(false), json!("")] {
            let mut errors = ErrorCollector::new();
            let saved = save_values(
                SectionKind::Body,
                Some(&body),
                Some(&wanted(&[("v", "v")])),
                &mut errors,
            );
            assert!(saved.is_empty());
            assert_eq!(
                errors.messages(),
                [r#"No body in response (wanted to save {"v":"v"})"#]
            );
        }
    }

    #[test]
    fn header_saves_ignore_case() {
        let mut errors = ErrorCollector::new();
        let headers = json!({"ETag": "\"v1\""});
        let saved = save_values(
            SectionKind::Headers,
            Some(&headers),
            Some(&wanted(&[("etag", "etag")])),
            &mut errors,
        );
        assert_eq!(saved.get("etag"), Some(&json!("\"v1\"")));
    }
}
