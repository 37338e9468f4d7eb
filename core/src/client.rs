//! Validating request builder for the notification subscription service.
//!
//! # Design
//! `SubscriptionClient` holds only immutable configuration behind an `Arc`,
//! so clones and concurrent calls never interfere. All three operations
//! funnel through `request`, which runs a strictly sequential pipeline:
//!
//! 1. resource type must be in the allow-list
//! 2. pid must be present when the operation needs one
//! 3. the `PidValidator` must approve it
//! 4. the `TokenSupplier` must produce a token
//! 5. the endpoint is built and the `Transport` invoked
//! 6. no-body statuses yield `None`, anything else is decoded as JSON
//!
//! Each step short-circuits, so a bad resource type never reaches the
//! validator and a rejected pid never costs a token fetch.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::{ClientConfig, ResolvedConfig};
use crate::error::{ApiError, ConfigError};
use crate::http::{merge_headers, HttpMethod, HttpRequest, HttpResponse, RequestOptions};

/// Client for subscribing pids to notification resource types.
#[derive(Clone)]
pub struct SubscriptionClient {
    inner: Arc<ResolvedConfig>,
}

impl SubscriptionClient {
    /// Validate `config` and build a client. Nothing is sent over the network.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(config.resolve()?),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn resource_types(&self) -> &BTreeSet<String> {
        &self.inner.resource_types
    }

    /// Subscribe `pid` to notifications of `resource_type`.
    ///
    /// Returns the service's JSON body, or `None` for a bodiless success.
    pub async fn subscribe(
        &self,
        pid: Option<&str>,
        resource_type: &str,
        options: RequestOptions,
    ) -> Result<Option<Value>, ApiError> {
        self.request(pid, resource_type, HttpMethod::Post, true, options)
            .await
    }

    /// Remove the subscription of `pid` to `resource_type`. Any response body
    /// is discarded.
    pub async fn unsubscribe(
        &self,
        pid: Option<&str>,
        resource_type: &str,
        options: RequestOptions,
    ) -> Result<(), ApiError> {
        self.request(pid, resource_type, HttpMethod::Delete, true, options)
            .await?;
        Ok(())
    }

    /// List the caller's subscriptions for `resource_type`. The body shape is
    /// defined by the service and passed through unchanged.
    pub async fn list_subscriptions(
        &self,
        resource_type: &str,
        options: RequestOptions,
    ) -> Result<Option<Value>, ApiError> {
        self.request(None, resource_type, HttpMethod::Get, false, options)
            .await
    }

    async fn request(
        &self,
        pid: Option<&str>,
        resource_type: &str,
        method: HttpMethod,
        pid_required: bool,
        options: RequestOptions,
    ) -> Result<Option<Value>, ApiError> {
        let cfg = &self.inner;

        let resource_type = resource_type.trim();
        if !cfg.resource_types.contains(resource_type) {
            return Err(ApiError::InvalidResourceType);
        }

        let pid = pid.unwrap_or_default().trim();
        if pid_required {
            if pid.is_empty() {
                return Err(ApiError::PidRequired);
            }
            if !cfg.pid_validator.validate(pid).await {
                return Err(ApiError::PidInvalid);
            }
        }

        let token = match cfg.token_supplier.token().await {
            Some(token) if !token.is_empty() => token,
            _ => return Err(ApiError::TokenRequired),
        };

        let path = endpoint(resource_type, pid_required.then_some(pid));
        let headers = merge_headers(
            vec![("Authorization".to_string(), format!("Bearer {token}"))],
            &options.headers,
        );
        let request = HttpRequest {
            method,
            path,
            headers,
            timeout: options.timeout,
        };

        debug!(method = method.as_str(), endpoint = %request.path, "dispatching request");
        let response = cfg.transport.send(request).await?;
        interpret(response)
    }
}

impl fmt::Debug for SubscriptionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionClient")
            .field("base_url", &self.inner.base_url)
            .field("resource_types", &self.inner.resource_types)
            .finish_non_exhaustive()
    }
}

/// `resource_type[/pid]`, each segment percent-encoded on its own.
///
/// Only RFC 3986 unreserved characters are left as-is, so `!'()*` are
/// encoded too, unlike JavaScript's `encodeURIComponent`.
pub(crate) fn endpoint(resource_type: &str, pid: Option<&str>) -> String {
    let mut path = urlencoding::encode(resource_type).into_owned();
    if let Some(pid) = pid.filter(|p| !p.is_empty()) {
        path.push('/');
        path.push_str(&urlencoding::encode(pid));
    }
    path
}

fn interpret(response: HttpResponse) -> Result<Option<Value>, ApiError> {
    if !response.has_body() {
        debug!(status = response.status, "bodiless response");
        return Ok(None);
    }
    debug!(status = response.status, "decoding response body");
    serde_json::from_str(&response.body)
        .map(Some)
        .map_err(|e| ApiError::Deserialization(e.to_string()))
}
