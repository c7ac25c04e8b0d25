//! Pluggable HTTP transport.
//!
//! The client needs exactly one capability from an HTTP implementation:
//! send a request, get a response. Keeping that behind a trait object lets
//! tests drive the pipeline without sockets and lets callers bring a
//! customized `reqwest::Client` (proxies, timeouts, pools).

use async_trait::async_trait;

/// A single-method HTTP transport.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs one HTTP round trip.
    async fn execute(
        &self,
        request: reqwest::Request,
    ) -> std::result::Result<reqwest::Response, reqwest::Error>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn execute(
        &self,
        request: reqwest::Request,
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        reqwest::Client::execute(self, request).await
    }
}
