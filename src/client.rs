//! The management API client.
//!
//! [`Client`] is the entry point for every operation. Use
//! [`Client::builder`] to configure one; the resulting client is immutable
//! and cheap to clone (configuration is shared behind an `Arc`), so a
//! single instance can serve concurrent callers.

use crate::rate_limit::{HeaderPolicy, RateLimitPolicy};
use crate::request::ApiRequest;
use crate::response;
use crate::transport::HttpTransport;
use crate::{Error, Result};
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com/v3";
const DEFAULT_MAX_RETRY_COUNT: u32 = 3;
const DEFAULT_MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(300);

/// A client for the management REST API.
///
/// Every call takes a [`CancellationToken`]; cancelling it aborts the call
/// promptly, including during a rate-limit wait. Callers that never cancel
/// can pass a fresh token.
///
/// # Examples
///
/// ```no_run
/// use sendgrid_api::{CancellationToken, Client};
///
/// # async fn example() -> Result<(), sendgrid_api::Error> {
/// let client = Client::builder(std::env::var("SENDGRID_API_KEY").unwrap()).build()?;
/// let cancel = CancellationToken::new();
///
/// let keys = client.list_api_keys(&cancel).await?;
/// for key in keys.result {
///     println!("{}: {}", key.api_key_id, key.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("subuser", &self.inner.subuser)
            .field("debug", &self.inner.debug)
            .field("max_retry_count", &self.inner.max_retry_count)
            .field("max_rate_limit_wait", &self.inner.max_rate_limit_wait)
            .finish_non_exhaustive()
    }
}

struct ClientInner {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
    subuser: Option<String>,
    debug: bool,
    max_retry_count: u32,
    max_rate_limit_wait: Duration,
    rate_limit_policy: Arc<dyn RateLimitPolicy>,
}

impl Client {
    /// Creates a new [`ClientBuilder`] holding the given API key.
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    /// Creates a client with default configuration.
    ///
    /// Equivalent to `Client::builder(api_key).build()`.
    pub fn new(api_key: impl Into<String>) -> Result<Client> {
        Client::builder(api_key).build()
    }

    /// Derives a client that impersonates the given subuser.
    ///
    /// The derived client shares this client's transport and configuration
    /// and adds an `On-Behalf-Of` header to every request. The original
    /// client is unchanged.
    pub fn on_behalf_of(&self, subuser: impl Into<String>) -> Client {
        let inner = &self.inner;
        Client {
            inner: Arc::new(ClientInner {
                transport: Arc::clone(&inner.transport),
                base_url: inner.base_url.clone(),
                api_key: inner.api_key.clone(),
                subuser: Some(subuser.into()),
                debug: inner.debug,
                max_retry_count: inner.max_retry_count,
                max_rate_limit_wait: inner.max_rate_limit_wait,
                rate_limit_policy: Arc::clone(&inner.rate_limit_policy),
            }),
        }
    }

    /// Makes a typed API call.
    ///
    /// This is the generic entry point behind the verb helpers; use it
    /// directly for endpoints this crate has no typed wrapper for.
    ///
    /// `path` is appended to the base URL verbatim and should start with
    /// `/`. `query` pairs are percent-encoded and appended. When `body` is
    /// given it is JSON-encoded (HTML characters such as `<` and `&` are
    /// left verbatim) and sent with `Content-Type: application/json`.
    ///
    /// The response body is JSON-decoded into `Res`; an empty body yields
    /// `Res::default()`, so action-style endpoints that answer 204 can
    /// decode into `()`.
    pub async fn call<Req, Res>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Req>,
        cancel: &CancellationToken,
    ) -> Result<Res>
    where
        Req: Serialize,
        Res: DeserializeOwned + Default,
    {
        let request = self.build_request(method, path, query, body)?;
        let body = self.call_bytes(&request, cancel).await?;
        response::decode_body(&body)
    }

    /// Makes a GET request.
    pub async fn get<Res>(&self, path: &str, cancel: &CancellationToken) -> Result<Res>
    where
        Res: DeserializeOwned + Default,
    {
        self.call::<(), Res>(Method::GET, path, &[], None, cancel)
            .await
    }

    /// Makes a GET request with query parameters.
    pub async fn get_with_query<Res>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> Result<Res>
    where
        Res: DeserializeOwned + Default,
    {
        self.call::<(), Res>(Method::GET, path, query, None, cancel)
            .await
    }

    /// Makes a GET request and returns the body verbatim.
    ///
    /// For endpoints that serve non-JSON payloads (exports, downloads);
    /// no decoding is attempted.
    pub async fn get_raw(&self, path: &str, cancel: &CancellationToken) -> Result<Bytes> {
        let request = self.build_request::<()>(Method::GET, path, &[], None)?;
        self.call_bytes(&request, cancel).await
    }

    /// Makes a POST request with a JSON body.
    pub async fn post<Req, Res>(
        &self,
        path: &str,
        body: &Req,
        cancel: &CancellationToken,
    ) -> Result<Res>
    where
        Req: Serialize,
        Res: DeserializeOwned + Default,
    {
        self.call(Method::POST, path, &[], Some(body), cancel).await
    }

    /// Makes a PUT request with a JSON body.
    pub async fn put<Req, Res>(
        &self,
        path: &str,
        body: &Req,
        cancel: &CancellationToken,
    ) -> Result<Res>
    where
        Req: Serialize,
        Res: DeserializeOwned + Default,
    {
        self.call(Method::PUT, path, &[], Some(body), cancel).await
    }

    /// Makes a PATCH request with a JSON body.
    pub async fn patch<Req, Res>(
        &self,
        path: &str,
        body: &Req,
        cancel: &CancellationToken,
    ) -> Result<Res>
    where
        Req: Serialize,
        Res: DeserializeOwned + Default,
    {
        self.call(Method::PATCH, path, &[], Some(body), cancel).await
    }

    /// Makes a DELETE request, discarding any response body.
    pub async fn delete(&self, path: &str, cancel: &CancellationToken) -> Result<()> {
        let request = self.build_request::<()>(Method::DELETE, path, &[], None)?;
        self.call_bytes(&request, cancel).await?;
        Ok(())
    }

    /// Composes a request descriptor: resolved URL, auth and subuser
    /// headers, serialized body. No I/O happens here.
    fn build_request<Req>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Req>,
    ) -> Result<ApiRequest>
    where
        Req: Serialize,
    {
        // Plain concatenation keeps the base's path prefix; Url::join would
        // resolve an absolute path against the host and drop it.
        let mut url = Url::parse(&format!("{}{}", self.inner.base_url, path))
            .map_err(|e| Error::Configuration(format!("invalid request URL: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", self.inner.api_key))
            .map_err(|e| Error::Configuration(format!("API key is not a valid header value: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, bearer);

        if let Some(subuser) = &self.inner.subuser {
            let value = HeaderValue::from_str(subuser).map_err(|e| {
                Error::Configuration(format!("subuser is not a valid header value: {e}"))
            })?;
            headers.insert("On-Behalf-Of", value);
        }

        let body = match body {
            Some(value) => {
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                Some(Bytes::from(
                    serde_json::to_vec(value).map_err(Error::Serialize)?,
                ))
            }
            None => None,
        };

        Ok(ApiRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// The attempt loop.
    ///
    /// Only rate-limit errors are retried: the wait is the provider's
    /// retry-after, bounded by the configured maximum and by cancellation.
    /// Every other error propagates on first occurrence.
    async fn call_bytes(&self, request: &ApiRequest, cancel: &CancellationToken) -> Result<Bytes> {
        if self.inner.max_retry_count == 0 {
            return Err(Error::Configuration(
                "max_retry_count is zero, no attempts would be made".to_string(),
            ));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.execute_once(request, cancel).await {
                Ok(body) => return Ok(body),
                Err(Error::RateLimited { retry_after })
                    if attempt < self.inner.max_retry_count =>
                {
                    let wait = retry_after.min(self.inner.max_rate_limit_wait);
                    tracing::debug!(
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        method = %request.method,
                        url = %request.url,
                        "rate limited, waiting before retry"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(Error::Canceled),
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        attempt,
                        method = %request.method,
                        url = %request.url,
                        "request failed"
                    );
                    return Err(err);
                }
            }
        }
    }

    /// One network round trip: dispatch, classify, buffer the body.
    async fn execute_once(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<Bytes> {
        if cancel.is_cancelled() {
            return Err(Error::Canceled);
        }

        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");

        let outgoing = request.to_http();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Canceled),
            result = self.inner.transport.execute(outgoing) => {
                result.map_err(|err| {
                    // Cancellation is the more informative cause when both
                    // raced; prefer it over the raw transport error.
                    if cancel.is_cancelled() {
                        Error::Canceled
                    } else {
                        Error::Transport(err)
                    }
                })?
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(response::classify_error(
                status,
                &headers,
                &body,
                self.inner.rate_limit_policy.as_ref(),
                self.inner.debug,
            ));
        }

        Ok(body)
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use sendgrid_api::Client;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), sendgrid_api::Error> {
/// let client = Client::builder("SG.my-key")
///     .subuser("analytics")
///     .max_retry_count(5)
///     .max_rate_limit_wait(Duration::from_secs(60))
///     .debug(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: String,
    base_url: String,
    subuser: Option<String>,
    debug: bool,
    max_retry_count: u32,
    max_rate_limit_wait: Duration,
    transport: Option<Arc<dyn HttpTransport>>,
    rate_limit_policy: Option<Arc<dyn RateLimitPolicy>>,
}

impl ClientBuilder {
    /// Creates a builder with default settings and the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            subuser: None,
            debug: false,
            max_retry_count: DEFAULT_MAX_RETRY_COUNT,
            max_rate_limit_wait: DEFAULT_MAX_RATE_LIMIT_WAIT,
            transport: None,
            rate_limit_policy: None,
        }
    }

    /// Overrides the base URL.
    ///
    /// The URL must not end with `/`; the path of each operation starts
    /// with one.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the subuser to impersonate on every request.
    pub fn subuser(mut self, subuser: impl Into<String>) -> Self {
        self.subuser = Some(subuser.into());
        self
    }

    /// Enables dumps of error responses to the `tracing` debug level.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the attempt budget per call (default 3).
    pub fn max_retry_count(mut self, count: u32) -> Self {
        self.max_retry_count = count;
        self
    }

    /// Caps the wait honored for a single rate-limit signal (default 5
    /// minutes).
    pub fn max_rate_limit_wait(mut self, wait: Duration) -> Self {
        self.max_rate_limit_wait = wait;
        self
    }

    /// Supplies a custom HTTP transport.
    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Supplies a custom rate-limit detection policy.
    pub fn rate_limit_policy(mut self, policy: impl RateLimitPolicy + 'static) -> Self {
        self.rate_limit_policy = Some(Arc::new(policy));
        self
    }

    /// Builds the configured [`Client`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the base URL does not parse or
    /// ends with a trailing slash, or if the default transport cannot be
    /// constructed.
    pub fn build(self) -> Result<Client> {
        Url::parse(&self.base_url)
            .map_err(|e| Error::Configuration(format!("invalid base URL {:?}: {e}", self.base_url)))?;
        if self.base_url.ends_with('/') {
            return Err(Error::Configuration(format!(
                "base URL must not have a trailing slash, but {:?} does",
                self.base_url
            )));
        }

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                reqwest::Client::builder()
                    .build()
                    .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?,
            ),
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                transport,
                base_url: self.base_url,
                api_key: self.api_key,
                subuser: self.subuser,
                debug: self.debug,
                max_retry_count: self.max_retry_count,
                max_rate_limit_wait: self.max_rate_limit_wait,
                rate_limit_policy: self
                    .rate_limit_policy
                    .unwrap_or_else(|| Arc::new(HeaderPolicy)),
            }),
        })
    }
}
