use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/live", get(live))
        .route("/ready", get(ready))
}

/// Liveness plus store detail; reports 200 even while the store is down so
/// the platform keeps the process alive and the app can serve its fallbacks.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match state.db_proxy() {
        Some(proxy) => {
            let snapshot = proxy.health_status().await;
            json!({
                "configured": true,
                "healthy": snapshot.healthy,
                "latencyMs": snapshot.latency_ms,
                "error": snapshot.error,
            })
        }
        None => json!({ "configured": false, "healthy": false }),
    };

    Json(json!({
        "status": "ok",
        "uptimeSeconds": state.uptime_seconds(),
        "database": database,
    }))
}

async fn live() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}

/// Ready unless a configured store has gone unhealthy; the unconfigured
/// degraded mode still serves fallbacks and counts as ready.
async fn ready(State(state): State<AppState>) -> Response {
    match state.db_proxy() {
        Some(proxy) if !proxy.health_status().await.healthy => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded" })),
        )
            .into_response(),
        _ => Json(json!({ "status": "ready" })).into_response(),
    }
}
