//! Loading expectation and recorded-response files

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde_json::Value;

use vouch_core::{ExpectedSpec, ResponseSnapshot, Variables};

/// Parse a JSON file by extension, anything else as YAML.
fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
    } else {
        serde_yml::from_str(&content).with_context(|| format!("invalid YAML in {}", path.display()))
    }
}

pub fn load_expected(path: &Path) -> Result<ExpectedSpec> {
    let raw: Value = load_document(path)?;
    ExpectedSpec::from_value(raw).with_context(|| format!("in {}", path.display()))
}

pub fn load_snapshot(path: &Path) -> Result<ResponseSnapshot> {
    load_document(path)
}

/// Apply `key=value` overrides on top of `variables`.
pub fn apply_vars(variables: &mut Variables, overrides: &[String]) -> Result<()> {
    for entry in overrides {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("--var expects key=value, got '{entry}'");
        };
        if key.is_empty() {
            bail!("--var has an empty key: '{entry}'");
        }
        variables.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vars_override_and_keep_equals_in_value() {
        let mut vars = Variables::new();
        vars.insert("host".into(), json!("old"));
        apply_vars(&mut vars, &["host=new".into(), "q=a=b".into()]).unwrap();
        assert_eq!(vars["host"], json!("new"));
        assert_eq!(vars["q"], json!("a=b"));
    }

    #[test]
    fn malformed_var_is_rejected() {
        let mut vars = Variables::new();
        assert!(apply_vars(&mut vars, &["novalue".into()]).is_err());
        assert!(apply_vars(&mut vars, &["=x".into()]).is_err());
    }

    #[test]
    fn expected_yaml_and_snapshot_json_load() {
        let dir = tempfile::tempdir().unwrap();
        let expect = dir.path().join("expect.yaml");
        std::fs::write(
            &expect,
            "status_code: 201\nbody:\n  id: ~\nsave:\n  body:\n    user_id: id\n",
        )
        .unwrap();
        let response = dir.path().join("response.json");
        std::fs::write(
            &response,
            r#"{"status_code": 201, "headers": {"Location": "/u/1"}, "body": {"id": 1}}"#,
        )
        .unwrap();

        let spec = load_expected(&expect).unwrap();
        assert_eq!(spec.status_code, 201);
        assert_eq!(spec.body, Some(json!({"id": null})));

        let snapshot = load_snapshot(&response).unwrap();
        assert_eq!(snapshot.status_code, 201);
        assert_eq!(snapshot.body, Some(json!({"id": 1})));
    }

    #[test]
    fn unknown_fields_in_expected_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let expect = dir.path().join("expect.json");
        std::fs::write(&expect, r#"{"stauts_code": 200}"#).unwrap();
        assert!(load_expected(&expect).is_err());
    }
}
