//! Completed HTTP responses as seen by the verifier

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response headers, ordered as received. Lookup ignores ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Mapping keyed by the first spelling seen for each name.
    ///
    /// Repeated headers are joined with `", "`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.entries {
            if let Some((_, Value::String(joined))) = map
                .iter_mut()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
            {
                joined.push_str(", ");
                joined.push_str(value);
                continue;
            }
            map.insert(name.clone(), Value::String(value.clone()));
        }
        Value::Object(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A completed HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_json(self, body: &Value) -> Self {
        self.with_body(body.to_string())
    }

    /// Decoded structured body, or `None` if it is empty, not JSON, or
    /// the JSON document `null`.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }
        serde_json::from_slice(&self.body)
            .ok()
            .filter(|v: &Value| !v.is_null())
    }

    /// Lossy UTF-8 view of the body.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Serializable recording of a response, e.g. from a dump file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    /// Raw body text, or any JSON document to be re-encoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl From<ResponseSnapshot> for HttpResponse {
    fn from(snapshot: ResponseSnapshot) -> Self {
        let body = match snapshot.body {
            None => Vec::new(),
            Some(Value::String(text)) => text.into_bytes(),
            Some(doc) => doc.to_string().into_bytes(),
        };
        Self {
            status: snapshot.status_code,
            headers: snapshot.headers.into_iter().collect(),
            body,
        }
    }
}
