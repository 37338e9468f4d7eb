//! Wire shapes returned by the notification service.
//!
//! The client passes response bodies through as `serde_json::Value` and never
//! enforces these types. They exist for callers (and the mock server's
//! tests) that want a typed view via `serde_json::from_value`.

use serde::{Deserialize, Serialize};

/// One subject's subscriptions for one resource type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub resource_ids: Vec<String>,
    pub resource_type: String,
    pub subject: String,
}
