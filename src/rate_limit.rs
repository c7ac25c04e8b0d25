//! Rate-limit detection with automatic header parsing.
//!
//! The provider signals rate limiting out of band of the JSON error shapes,
//! so detection is a pluggable policy. The default recognizes HTTP 429
//! combined with the common reset headers.

use http::{HeaderMap, StatusCode};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Decides whether a response is a rate-limit signal.
///
/// Implement this to adapt the client to a provider (or proxy) that signals
/// rate limiting differently, e.g. through a custom header or status code.
///
/// # Examples
///
/// ```
/// use sendgrid_api::rate_limit::RateLimitPolicy;
/// use http::{HeaderMap, StatusCode};
/// use std::time::Duration;
///
/// struct FlatBackoff;
///
/// impl RateLimitPolicy for FlatBackoff {
///     fn retry_after(&self, status: StatusCode, _headers: &HeaderMap) -> Option<Duration> {
///         (status == StatusCode::TOO_MANY_REQUESTS).then(|| Duration::from_secs(1))
///     }
/// }
/// ```
pub trait RateLimitPolicy: Send + Sync {
    /// Returns the recommended wait before resending, or `None` when the
    /// response is not a rate-limit signal.
    fn retry_after(&self, status: StatusCode, headers: &HeaderMap) -> Option<Duration>;
}

/// The default detection policy.
///
/// A response is rate limited when its status is `429 Too Many Requests`
/// and either of the following headers yields a wait:
/// - `Retry-After` (delay-seconds or HTTP-date)
/// - `X-RateLimit-Reset` / `RateLimit-Reset` (Unix timestamp)
///
/// A 429 carrying neither header is left to ordinary error classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderPolicy;

impl RateLimitPolicy for HeaderPolicy {
    fn retry_after(&self, status: StatusCode, headers: &HeaderMap) -> Option<Duration> {
        if status != StatusCode::TOO_MANY_REQUESTS {
            return None;
        }
        parse_retry_after(headers).or_else(|| parse_rate_limit_reset(headers))
    }
}

/// Parses the `Retry-After` header.
///
/// Supports both delay-seconds (integer) and HTTP-date formats.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get("retry-after")?.to_str().ok()?;

    if let Ok(seconds) = header.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    if let Ok(date_time) = httpdate::parse_http_date(header) {
        if let Ok(duration) = date_time.duration_since(SystemTime::now()) {
            return Some(duration);
        }
    }

    None
}

/// Parses `X-RateLimit-Reset` or `RateLimit-Reset` (Unix timestamp) into
/// the remaining wait. A reset time already in the past yields `None`.
fn parse_rate_limit_reset(headers: &HeaderMap) -> Option<Duration> {
    let timestamp = ["x-ratelimit-reset", "ratelimit-reset"]
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())?;

    let reset_at = UNIX_EPOCH + Duration::from_secs(timestamp);
    reset_at.duration_since(SystemTime::now()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("60"));

        let wait = HeaderPolicy.retry_after(StatusCode::TOO_MANY_REQUESTS, &headers);
        assert_eq!(wait, Some(Duration::from_secs(60)));
    }

    #[test]
    fn retry_after_http_date() {
        let mut headers = HeaderMap::new();
        let date = httpdate::fmt_http_date(SystemTime::now() + Duration::from_secs(120));
        headers.insert("retry-after", HeaderValue::from_str(&date).unwrap());

        let wait = HeaderPolicy
            .retry_after(StatusCode::TOO_MANY_REQUESTS, &headers)
            .expect("future date should yield a wait");
        assert!(wait <= Duration::from_secs(120));
        assert!(wait >= Duration::from_secs(110));
    }

    #[test]
    fn reset_timestamp_yields_remaining_wait() {
        let mut headers = HeaderMap::new();
        let reset = SystemTime::now() + Duration::from_secs(120);
        let timestamp = reset.duration_since(UNIX_EPOCH).unwrap().as_secs();
        headers.insert(
            "x-ratelimit-reset",
            HeaderValue::from_str(&timestamp.to_string()).unwrap(),
        );

        let wait = HeaderPolicy
            .retry_after(StatusCode::TOO_MANY_REQUESTS, &headers)
            .expect("future reset should yield a wait");
        // Unix timestamps are whole seconds, so up to one second is truncated.
        assert!(wait >= Duration::from_secs(118));
        assert!(wait <= Duration::from_secs(120));
    }

    #[test]
    fn reset_in_the_past_is_not_a_wait() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1000000"));

        let wait = HeaderPolicy.retry_after(StatusCode::TOO_MANY_REQUESTS, &headers);
        assert_eq!(wait, None);
    }

    #[test]
    fn only_429_is_rate_limited() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("60"));

        let wait = HeaderPolicy.retry_after(StatusCode::SERVICE_UNAVAILABLE, &headers);
        assert_eq!(wait, None);
    }

    #[test]
    fn headerless_429_is_not_detected() {
        let headers = HeaderMap::new();
        let wait = HeaderPolicy.retry_after(StatusCode::TOO_MANY_REQUESTS, &headers);
        assert_eq!(wait, None);
    }
}
