//! Project configuration for response verification

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::template::Variables;

/// Header carrying the redirect target when none is configured.
pub const DEFAULT_REDIRECT_HEADER: &str = "location";

fn default_redirect_header() -> String {
    DEFAULT_REDIRECT_HEADER.to_string()
}

/// Project configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Variables available to `{name}` placeholders in expectations
    #[serde(default)]
    pub variables: Variables,

    /// Header whose URL query string becomes `redirect_query_params`
    #[serde(default = "default_redirect_header")]
    pub redirect_header: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variables: Variables::new(),
            redirect_header: default_redirect_header(),
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.vouch.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load the first default-named config found in `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = [".vouch.toml", ".vouch.json", "vouch.toml"];

        for name in candidates {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        // No config file, return default
        Ok(Self::default())
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# vouch configuration

# Header holding the redirect URL for redirect_query_params
redirect_header = "location"

# Variables usable as {name} placeholders in expected values
[variables]
host = "localhost:8080"
# user_id = 42

# [variables.tokens]
# access = "your-token-here"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.redirect_header, "location");
        assert!(config.variables.is_empty());
    }

    #[test]
    fn parse_toml() {
        let toml = r#"
redirect_header = "Content-Location"

[variables]
name = "alice"
user_id = 42

[variables.tokens]
access = "abc"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.redirect_header, "Content-Location");
        assert_eq!(config.variables.get("name"), Some(&json!("alice")));
        assert_eq!(config.variables.get("user_id"), Some(&json!(42)));
        assert_eq!(config.variables.get("tokens"), Some(&json!({"access": "abc"})));
    }

    #[test]
    fn example_parses() {
        let config: Config = toml::from_str(Config::example()).unwrap();
        assert_eq!(config.variables.get("host"), Some(&json!("localhost:8080")));
    }

    #[test]
    fn load_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{"variables": {"a": 1}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.variables.get("a"), Some(&json!(1)));
        assert_eq!(config.redirect_header, "location");
    }

    #[test]
    fn load_from_dir_prefers_dot_toml_and_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_from_dir(dir.path()).unwrap(), Config::default());

        std::fs::write(dir.path().join(".vouch.toml"), "redirect_header = \"x-next\"\n").unwrap();
        std::fs::write(dir.path().join("vouch.toml"), "redirect_header = \"ignored\"\n").unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.redirect_header, "x-next");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/vouch.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
