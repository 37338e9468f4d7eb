//! Client configuration and its one-time normalization.
//!
//! # Design
//! `ClientConfig` is the caller-facing record with optional fields and
//! documented defaults. `ClientConfig::resolve` validates it in a fixed order
//! and produces `ResolvedConfig`, the immutable form the client keeps for its
//! whole lifetime.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::auth::{AcceptAllPids, PidValidator, TokenSupplier};
use crate::error::ConfigError;
use crate::http::Transport;
use crate::transport::UreqTransport;

/// Resource types accepted when `with_resource_types` is never called.
pub const DEFAULT_RESOURCE_TYPES: [&str; 2] = ["datasetChanges", "citations"];

/// Configuration for `SubscriptionClient::new`.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Required.
    pub token_supplier: Option<Arc<dyn TokenSupplier>>,
    /// Defaults to `AcceptAllPids`.
    pub pid_validator: Option<Arc<dyn PidValidator>>,
    /// Defaults to `DEFAULT_RESOURCE_TYPES`.
    pub resource_types: Vec<String>,
    /// Defaults to a `UreqTransport` bound to the normalized base URL.
    pub transport: Option<Arc<dyn Transport>>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token_supplier: None,
            pid_validator: None,
            resource_types: DEFAULT_RESOURCE_TYPES.iter().map(|s| s.to_string()).collect(),
            transport: None,
        }
    }

    pub fn with_token_supplier(mut self, supplier: impl TokenSupplier + 'static) -> Self {
        self.token_supplier = Some(Arc::new(supplier));
        self
    }

    pub fn with_pid_validator(mut self, validator: impl PidValidator + 'static) -> Self {
        self.pid_validator = Some(Arc::new(validator));
        self
    }

    pub fn with_resource_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Validate and normalize. The first failing check wins:
    /// base URL, token supplier, resource types.
    pub(crate) fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        if base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        let token_supplier = self.token_supplier.ok_or(ConfigError::MissingTokenSupplier)?;
        let pid_validator = self
            .pid_validator
            .unwrap_or_else(|| Arc::new(AcceptAllPids));
        let resource_types = normalize_resource_types(&self.resource_types)?;
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(UreqTransport::new(&base_url)));

        Ok(ResolvedConfig {
            base_url,
            token_supplier,
            pid_validator,
            resource_types,
            transport,
        })
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token_supplier", &self.token_supplier.is_some())
            .field("pid_validator", &self.pid_validator.is_some())
            .field("resource_types", &self.resource_types)
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

/// Trim each entry, drop blanks, dedupe. Matching stays case-sensitive.
pub(crate) fn normalize_resource_types(types: &[String]) -> Result<BTreeSet<String>, ConfigError> {
    let set: BTreeSet<String> = types
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if set.is_empty() {
        return Err(ConfigError::EmptyResourceTypes);
    }
    Ok(set)
}

pub(crate) struct ResolvedConfig {
    pub(crate) base_url: String,
    pub(crate) token_supplier: Arc<dyn TokenSupplier>,
    pub(crate) pid_validator: Arc<dyn PidValidator>,
    pub(crate) resource_types: BTreeSet<String>,
    pub(crate) transport: Arc<dyn Transport>,
}
