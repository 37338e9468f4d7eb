//! Injected capabilities: bearer-token retrieval and pid validation.
//!
//! Both are re-invoked on every call, so a supplier may hand out a refreshed
//! token each time. Any `Fn` returning a matching future implements the
//! trait, which covers the common case of passing an async closure:
//!
//! ```
//! use subscriptions_core::{PidValidator, TokenSupplier};
//!
//! fn takes_supplier(_: impl TokenSupplier) {}
//! fn takes_validator(_: impl PidValidator) {}
//!
//! takes_supplier(|| async { Some("token".to_string()) });
//! takes_validator(|pid: String| async move { pid.starts_with("doi:") });
//! ```

use std::future::Future;

use async_trait::async_trait;

/// Produces the bearer token for one request. `None` or an empty string
/// means no token is available.
#[async_trait]
pub trait TokenSupplier: Send + Sync {
    async fn token(&self) -> Option<String>;
}

#[async_trait]
impl<F, Fut> TokenSupplier for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Option<String>> + Send + 'static,
{
    async fn token(&self) -> Option<String> {
        (self)().await
    }
}

/// Decides whether a trimmed, non-empty pid may be sent to the service.
#[async_trait]
pub trait PidValidator: Send + Sync {
    async fn validate(&self, pid: &str) -> bool;
}

#[async_trait]
impl<F, Fut> PidValidator for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send + 'static,
{
    async fn validate(&self, pid: &str) -> bool {
        (self)(pid.to_string()).await
    }
}

/// Default validator. Approves every pid.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllPids;

#[async_trait]
impl PidValidator for AcceptAllPids {
    async fn validate(&self, _pid: &str) -> bool {
        true
    }
}
