//! Error types for the subscription client.
//!
//! # Design
//! Construction failures (`ConfigError`) are kept apart from per-call
//! failures (`ApiError`) because a client that was built successfully can
//! never produce a `ConfigError` again. Transport failures are carried
//! through `ApiError::Transport` unmodified.

use thiserror::Error;

/// Errors returned by `SubscriptionClient::new`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("baseUrl required")]
    MissingBaseUrl,

    #[error("token supplier required")]
    MissingTokenSupplier,

    /// Every entry was blank after trimming, or the collection was empty.
    #[error("resourceTypes must be a non-empty collection of strings")]
    EmptyResourceTypes,
}

/// Failures surfaced by a `Transport` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport's status policy rejected the response.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, DNS, TLS, timeout or I/O failure.
    #[error("network error: {0}")]
    Network(String),
}

/// Coarse classification of an `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    Transport,
    Parse,
}

/// Errors returned by the per-call operations of `SubscriptionClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The resource type is not in the configured allow-list.
    #[error("invalid resource type")]
    InvalidResourceType,

    #[error("pid required")]
    PidRequired,

    /// The configured `PidValidator` rejected the pid.
    #[error("pid invalid")]
    PidInvalid,

    /// The `TokenSupplier` produced no usable token.
    #[error("token required")]
    TokenRequired,

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidResourceType | ApiError::PidRequired | ApiError::PidInvalid => {
                ErrorKind::Validation
            }
            ApiError::TokenRequired => ErrorKind::Auth,
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Deserialization(_) => ErrorKind::Parse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_documented_contract() {
        assert_eq!(ConfigError::MissingBaseUrl.to_string(), "baseUrl required");
        assert_eq!(ConfigError::MissingTokenSupplier.to_string(), "token supplier required");
        assert_eq!(ApiError::InvalidResourceType.to_string(), "invalid resource type");
        assert_eq!(ApiError::PidRequired.to_string(), "pid required");
        assert_eq!(ApiError::PidInvalid.to_string(), "pid invalid");
        assert_eq!(ApiError::TokenRequired.to_string(), "token required");
    }

    #[test]
    fn transport_errors_display_transparently() {
        let err = ApiError::from(TransportError::Status {
            status: 503,
            body: "unavailable".to_string(),
        });
        assert_eq!(err.to_string(), "HTTP 503: unavailable");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn kinds_follow_the_failure_stage() {
        assert_eq!(ApiError::PidInvalid.kind(), ErrorKind::Validation);
        assert_eq!(ApiError::TokenRequired.kind(), ErrorKind::Auth);
        assert_eq!(ApiError::Deserialization("eof".into()).kind(), ErrorKind::Parse);
    }
}
