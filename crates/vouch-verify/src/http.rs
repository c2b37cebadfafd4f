//! Conversion from `reqwest` responses

use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use vouch_core::{Headers, HttpResponse};

/// Build an [`HttpResponse`] from already-read response parts.
///
/// Header values that are not valid UTF-8 are converted lossily.
#[must_use]
pub fn from_parts(status: StatusCode, headers: &HeaderMap, body: impl Into<Vec<u8>>) -> HttpResponse {
    let headers: Headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    HttpResponse {
        status: status.as_u16(),
        headers,
        body: body.into(),
    }
}

/// Read a blocking `reqwest` response to completion.
///
/// # Errors
///
/// Returns the transport error if the body cannot be read.
pub fn from_blocking(response: reqwest::blocking::Response) -> Result<HttpResponse, reqwest::Error> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes()?;
    Ok(from_parts(status, &headers, body.to_vec()))
}
