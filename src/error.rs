//! Error types for management API calls.
//!
//! All failures surface as the single [`Error`] enum. Provider-reported
//! errors keep the exact message text from the wire so callers can match on
//! it or log it verbatim; transport and decoding failures wrap their
//! underlying error.

use http::StatusCode;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// The error type for all client operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The client or a request was misconfigured.
    ///
    /// Raised for a base URL with a trailing slash, a zero retry budget,
    /// or an invalid header value. Never produced by the server and never
    /// retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A network-level failure (connection refused, DNS, TLS, ...).
    ///
    /// Wraps the underlying `reqwest::Error`. If the cancellation token
    /// fired while the request was in flight, [`Error::Canceled`] is
    /// returned instead as the more informative cause.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller's cancellation token fired.
    ///
    /// Returned both for cancellation during the network round trip and
    /// for cancellation during a rate-limit wait.
    #[error("request canceled")]
    Canceled,

    /// The provider asked us to slow down.
    ///
    /// Carries the wait the provider recommended before resending. The
    /// client retries these automatically while its attempt budget lasts.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// How long to wait before the request may be resent.
        retry_after: Duration,
    },

    /// A provider error of the form `{"error": "message"}`.
    ///
    /// The display output is exactly the provider's message.
    #[error("{0}")]
    Api(String),

    /// Provider validation errors of the form
    /// `{"errors": [{"field": ..., "message": ...}, ...]}`.
    ///
    /// The display output joins each entry as `field: <f>, message: <m>`
    /// (the field segment is omitted when absent), in wire order.
    #[error("{}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// A non-2xx response whose body matched none of the known error
    /// shapes.
    #[error("server error: {status}")]
    Status {
        /// The numeric HTTP status code.
        code: u16,
        /// The status line text, e.g. `503 Service Unavailable`.
        status: String,
    },

    /// The request body could not be serialized to JSON.
    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A 2xx response body could not be decoded into the expected type.
    ///
    /// An empty body is never a decode error; it decodes to the
    /// destination type's default value.
    #[error("failed to decode response: {source}")]
    Decode {
        /// The raw response body that failed to decode.
        raw_body: String,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns `true` if this error is a rate-limit signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }

    /// Returns the provider-recommended wait for rate-limit errors.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this error carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status { code, .. } => StatusCode::from_u16(*code).ok(),
            Error::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub(crate) fn status_line(status: StatusCode) -> Self {
        Error::Status {
            code: status.as_u16(),
            status: status.to_string(),
        }
    }
}

/// A single entry of the provider's multi-error shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    /// The request field the error refers to, when the provider names one.
    #[serde(default)]
    pub field: Option<String>,
    /// The error message.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "field: {}, ", field)?;
        }
        write!(f, "message: {}", self.message)
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A specialized `Result` type for management API calls.
pub type Result<T> = std::result::Result<T, Error>;
