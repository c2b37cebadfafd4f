//! Query parameters of a redirect target

use serde_json::{Map, Value};
use url::Url;

/// Base used to parse relative redirect targets like `/cb?code=x`.
const RELATIVE_BASE: &str = "http://redirect.invalid/";

/// Flat `name → value` map of the query string in `location`.
///
/// Pairs with a blank value (`?code=`) are skipped. Repeated names keep
/// their first non-blank value; later ones are dropped. A target that
/// cannot be parsed yields an empty map.
#[must_use]
pub fn query_params(location: &str) -> Map<String, Value> {
    let mut params = Map::new();

    let parsed = Url::parse(RELATIVE_BASE).and_then(|base| base.join(location));
    let url = match parsed {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(location, error = %e, "Unparseable redirect url");
            return params;
        }
    };

    for (name, value) in url.query_pairs() {
        if value.is_empty() {
            continue;
        }
        if !params.contains_key(name.as_ref()) {
            params.insert(name.into_owned(), Value::String(value.into_owned()));
        }
    }

    params
}
