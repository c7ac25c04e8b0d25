//! Request descriptors.

use bytes::Bytes;
use http::{HeaderMap, Method};
use url::Url;

/// A fully resolved request, ready for dispatch.
///
/// Built once per call by the client; the retry loop materializes a fresh
/// transport request from it on every attempt, so a descriptor is never
/// consumed by a failed send.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Bytes>,
}

impl ApiRequest {
    /// Materializes a transport request for a single attempt.
    pub(crate) fn to_http(&self) -> reqwest::Request {
        let mut request = reqwest::Request::new(self.method.clone(), self.url.clone());
        *request.headers_mut() = self.headers.clone();
        if let Some(body) = &self.body {
            *request.body_mut() = Some(reqwest::Body::from(body.clone()));
        }
        request
    }
}
