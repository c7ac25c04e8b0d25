//! Response classification and decoding.
//!
//! Provider error bodies are inconsistent across endpoints: some return
//! `{"error": "..."}`, some `{"errors": [...]}`, some a bare status line.
//! Classification buffers the body once and tries each shape in order,
//! falling through silently until one matches.

use crate::error::{Error, FieldError};
use crate::rate_limit::RateLimitPolicy;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
struct SingleErrorBody {
    #[serde(default)]
    error: String,
}

#[derive(Deserialize)]
struct MultiErrorBody {
    #[serde(default)]
    errors: Vec<FieldError>,
}

/// Turns a non-2xx response into a typed error.
///
/// Order matters: the rate-limit policy runs first (its signal lives in
/// status and headers, not the body), then the single-error shape, then the
/// multi-error shape, then the status-line fallback. A shape that parses
/// but is empty falls through like one that does not parse at all.
pub(crate) fn classify_error(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    policy: &dyn RateLimitPolicy,
    debug: bool,
) -> Error {
    if debug {
        tracing::debug!(
            status = status.as_u16(),
            headers = ?headers,
            body = %String::from_utf8_lossy(body),
            "api error response"
        );
    }

    if let Some(retry_after) = policy.retry_after(status, headers) {
        return Error::RateLimited { retry_after };
    }

    if let Ok(single) = serde_json::from_slice::<SingleErrorBody>(body) {
        if !single.error.is_empty() {
            return Error::Api(single.error);
        }
    }

    if let Ok(multi) = serde_json::from_slice::<MultiErrorBody>(body) {
        if !multi.errors.is_empty() {
            return Error::Validation(multi.errors);
        }
    }

    Error::status_line(status)
}

/// Decodes a 2xx body into the caller's type.
///
/// An empty body (204-style responses) decodes to the type's default value.
pub(crate) fn decode_body<Res>(body: &[u8]) -> crate::Result<Res>
where
    Res: DeserializeOwned + Default,
{
    if body.is_empty() {
        return Ok(Res::default());
    }

    serde_json::from_slice(body).map_err(|source| Error::Decode {
        raw_body: String::from_utf8_lossy(body).into_owned(),
        source,
    })
}
