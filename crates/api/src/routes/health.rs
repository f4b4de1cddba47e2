use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

/// Health check endpoint. Reports scanner state and when the last cycle finished.
async fn healthz(State(state): State<AppState>) -> Json<Value> {
    let scanner_state = state.scanner.state().await;
    let last_scan = state.scanner.latest_report().await.map(|r| r.finished_at);
    Json(json!({
        "status": "ok",
        "scanner": scanner_state.to_string(),
        "last_scan": last_scan,
    }))
}
