use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use common::Classification;
use engine::ScanResult;
use strategy::IndicatorFrame;

use crate::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 100;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/results", get(get_results))
        .route("/api/results/:symbol", get(get_result))
        .route("/api/history", get(get_history))
}

// ─── Results ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ResultsQuery {
    /// `buy` keeps only BUY classifications.
    filter: Option<String>,
}

/// One row of the results table: the classification plus the latest frame.
#[derive(Serialize)]
struct ResultSummary<'a> {
    symbol: &'a str,
    #[serde(flatten)]
    classification: Classification,
    evaluated_at: DateTime<Utc>,
    latest: Option<&'a IndicatorFrame>,
}

impl<'a> From<&'a ScanResult> for ResultSummary<'a> {
    fn from(r: &'a ScanResult) -> Self {
        Self {
            symbol: &r.symbol,
            classification: r.classification,
            evaluated_at: r.evaluated_at,
            latest: r.latest_frame(),
        }
    }
}

async fn get_results(
    State(state): State<AppState>,
    Query(q): Query<ResultsQuery>,
) -> Json<Value> {
    let only_buy = q
        .filter
        .as_deref()
        .map(|f| f.eq_ignore_ascii_case("buy"))
        .unwrap_or(false);

    let Some(report) = state.scanner.latest_report().await else {
        return Json(json!({
            "scanned_at": null,
            "filter_buy": only_buy,
            "results": [],
            "failures": [],
            "total": 0,
        }));
    };

    let rows: Vec<ResultSummary> = report
        .results
        .iter()
        .filter(|r| !only_buy || r.classification.is_buy())
        .map(ResultSummary::from)
        .collect();

    Json(json!({
        "scanned_at": report.finished_at,
        "filter_buy": only_buy,
        "total": rows.len(),
        "results": rows,
        "failures": report.failures,
    }))
}

/// Full frame sequence for one symbol, for chart rendering.
async fn get_result(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no result for '{symbol}'") })),
        )
    };

    let report = state.scanner.latest_report().await.ok_or_else(not_found)?;
    let result = report.result(&symbol).ok_or_else(not_found)?;
    Ok(Json(json!(result)))
}

// ─── History ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn get_history(State(state): State<AppState>, Query(q): Query<HistoryQuery>) -> Json<Value> {
    let limit = q.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let entries = state.scanner.recent_history(limit).await;
    Json(json!({
        "entries": entries,
        "count": entries.len(),
    }))
}
