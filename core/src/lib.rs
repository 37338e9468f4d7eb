//! Async client core for a notification subscription service.
//!
//! # Overview
//! Turns a (pid, resource type, operation) triple into an authenticated,
//! correctly addressed HTTP request, validates inputs before anything is
//! sent, and normalizes JSON and bodiless responses into one return
//! contract.
//!
//! # Design
//! - `SubscriptionClient` holds only immutable configuration; concurrent
//!   calls share nothing mutable.
//! - Token retrieval and pid validation are injected capabilities
//!   (`TokenSupplier`, `PidValidator`) re-invoked on every call.
//! - The network round-trip sits behind the `Transport` trait. `UreqTransport`
//!   is used when none is injected; tests substitute recording doubles.
//!   No particular async runtime is required to drive the client.
//! - Response bodies are passed through as `serde_json::Value`.
//!
//! ```no_run
//! use subscriptions_core::{ClientConfig, RequestOptions, SubscriptionClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SubscriptionClient::new(
//!     ClientConfig::new("https://notifications.example.org/api/subscriptions")
//!         .with_token_supplier(|| async { std::env::var("NOTIFY_TOKEN").ok() }),
//! )?;
//! client
//!     .subscribe(Some("doi:10.5072/FK2/ABC"), "datasetChanges", RequestOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use auth::{AcceptAllPids, PidValidator, TokenSupplier};
pub use client::SubscriptionClient;
pub use config::{ClientConfig, DEFAULT_RESOURCE_TYPES};
pub use error::{ApiError, ConfigError, ErrorKind, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestOptions, Transport, NO_BODY_STATUSES};
pub use transport::UreqTransport;
pub use types::SubscriptionRecord;
