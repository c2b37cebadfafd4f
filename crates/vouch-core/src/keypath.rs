//! Dotted key paths and their resolution against nested data
//!
//! A key path like `user.roles.0.name` walks mappings by key and sequences
//! by integer index. Splitting is on ASCII `.` with no escaping, so a key
//! that itself contains a `.` cannot be addressed.

use serde_json::Value;

/// How mapping keys are compared while walking a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMatch {
    /// Keys must match byte for byte
    #[default]
    Exact,
    /// Keys match ignoring ASCII case (HTTP header names)
    IgnoreAsciiCase,
}

/// Why a key path could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyPathError {
    #[error("key '{key}' not found")]
    KeyNotFound { key: String },
    #[error("index '{index}' not found")]
    IndexNotFound { index: String },
}

/// An ordered sequence of path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    joined: String,
    segments: Vec<String>,
}

impl KeyPath {
    /// Split a dotted key into segments.
    #[must_use]
    pub fn parse(joined: &str) -> Self {
        Self {
            joined: joined.to_string(),
            segments: joined.split('.').map(str::to_string).collect(),
        }
    }

    /// The empty path, resolving to the container itself.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            joined: String::new(),
            segments: Vec::new(),
        }
    }

    /// A single-segment path addressing a sequence position.
    #[must_use]
    pub fn index(idx: usize) -> Self {
        let s = idx.to_string();
        Self {
            joined: s.clone(),
            segments: vec![s],
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The path as it was written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.joined
    }

    /// Walk `container` along this path.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPathError`] when a segment does not exist. A key that is
    /// present with a `null` value resolves successfully.
    pub fn resolve<'a>(&self, container: &'a Value, mode: KeyMatch) -> Result<&'a Value, KeyPathError> {
        resolve(container, &self.segments, mode)
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.joined)
    }
}

/// Walk `container` along `segments`.
///
/// # Errors
///
/// `KeyNotFound` when a mapping lacks the segment or a scalar is reached
/// before the path ends, `IndexNotFound` when a sequence index is
/// non-numeric or out of range.
pub fn resolve<'a, S: AsRef<str>>(
    container: &'a Value,
    segments: &[S],
    mode: KeyMatch,
) -> Result<&'a Value, KeyPathError> {
    let mut current = container;
    for segment in segments {
        let segment = segment.as_ref();
        current = match current {
            Value::Object(map) => {
                let found = match mode {
                    KeyMatch::Exact => map.get(segment),
                    KeyMatch::IgnoreAsciiCase => map.get(segment).or_else(|| {
                        map.iter()
                            .find(|(k, _)| k.eq_ignore_ascii_case(segment))
                            .map(|(_, v)| v)
                    }),
                };
                found.ok_or_else(|| KeyPathError::KeyNotFound {
                    key: segment.to_string(),
                })?
            }
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|idx| items.get(idx))
                .ok_or_else(|| KeyPathError::IndexNotFound {
                    index: segment.to_string(),
                })?,
            _ => {
                return Err(KeyPathError::KeyNotFound {
                    key: segment.to_string(),
                });
            }
        };
    }
    Ok(current)
}
