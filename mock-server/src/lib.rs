use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub resource_ids: Vec<String>,
    pub resource_type: String,
    pub subject: String,
}

/// (subject, resource type) -> subscribed pids
pub type Db = Arc<RwLock<HashMap<(String, String), BTreeSet<String>>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/{resource_type}", get(list_subscriptions))
        .route(
            "/{resource_type}/{pid}",
            post(subscribe).delete(unsubscribe),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// The bearer token doubles as the subject.
fn subject(headers: &HeaderMap) -> Result<String, StatusCode> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or(StatusCode::UNAUTHORIZED)
}

fn record(subject: &str, resource_type: &str, pids: &BTreeSet<String>) -> SubscriptionRecord {
    SubscriptionRecord {
        resource_ids: pids.iter().cloned().collect(),
        resource_type: resource_type.to_string(),
        subject: subject.to_string(),
    }
}

async fn list_subscriptions(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(resource_type): Path<String>,
) -> Result<Json<Vec<SubscriptionRecord>>, StatusCode> {
    let subject = subject(&headers)?;
    let db = db.read().await;
    let records = db
        .get(&(subject.clone(), resource_type.clone()))
        .filter(|pids| !pids.is_empty())
        .map(|pids| vec![record(&subject, &resource_type, pids)])
        .unwrap_or_default();
    Ok(Json(records))
}

async fn subscribe(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((resource_type, pid)): Path<(String, String)>,
) -> Result<Json<SubscriptionRecord>, StatusCode> {
    let subject = subject(&headers)?;
    debug!(%subject, %resource_type, %pid, "subscribe");
    let mut db = db.write().await;
    let pids = db
        .entry((subject.clone(), resource_type.clone()))
        .or_default();
    pids.insert(pid);
    Ok(Json(record(&subject, &resource_type, pids)))
}

async fn unsubscribe(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((resource_type, pid)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    let subject = subject(&headers)?;
    debug!(%subject, %resource_type, %pid, "unsubscribe");
    let mut db = db.write().await;
    if let Some(pids) = db.get_mut(&(subject, resource_type)) {
        pids.remove(&pid);
    }
    Ok(StatusCode::NO_CONTENT)
}
