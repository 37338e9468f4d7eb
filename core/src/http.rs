//! HTTP transport types and the `Transport` capability.
//!
//! # Design
//! Requests and responses are plain data. The client builds an `HttpRequest`
//! holding only the endpoint path relative to the base URL, and hands it to
//! a `Transport` which owns the network round-trip. Anything implementing
//! `Transport` can stand in for the default `UreqTransport`, which is how the
//! tests observe exactly what the client would send.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;

/// Status codes that conventionally carry no payload. The client never
/// decodes a body for these.
pub const NO_BODY_STATUSES: [u16; 3] = [204, 205, 304];

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Per-call options forwarded to the transport.
///
/// `headers` are merged on top of the headers the client sets itself; on a
/// case-insensitive name collision the value given here wins, including for
/// `Authorization`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the percent-encoded endpoint relative to the base URL, e.g.
/// `datasetChanges/doi%3A10.1%2Fx`. No request body is ever sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn has_body(&self) -> bool {
        !NO_BODY_STATUSES.contains(&self.status)
    }
}

/// Executes an `HttpRequest` against the remote service.
///
/// Status policy, timeouts, retries and connection handling all belong to
/// the implementation. The client only consumes the result.
///
/// Dropping the returned future ends the caller's wait. Whether a request
/// already in flight is aborted is up to the implementation; see
/// `UreqTransport` for the default behavior.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Merge `overrides` on top of `base`. A header in `overrides` replaces every
/// header in `base` with the same case-insensitive name.
pub(crate) fn merge_headers(
    base: Vec<(String, String)>,
    overrides: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = base
        .into_iter()
        .filter(|(k, _)| !overrides.iter().any(|(o, _)| o.eq_ignore_ascii_case(k)))
        .collect();
    merged.extend(overrides.iter().cloned());
    merged
}
