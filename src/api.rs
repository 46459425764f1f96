// src/api.rs
//! HTTP surface: a single read endpoint returning the composed report,
//! plus a health probe. Only this layer may surface a user-visible
//! failure; every inner best-effort call owns its own fallback.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use metrics::counter;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::config::AppConfig;
use crate::report::generate_report;
use crate::upstream::Upstream;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn Upstream>,
    pub config: Arc<AppConfig>,
}

pub fn create_router(state: AppState) -> Router {
    crate::metrics::ensure_metrics_described();

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/report", get(report))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn report(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    counter!("report_requests_total").increment(1);

    let workspace_id = params.get("workspace_id").and_then(|v| v.parse().ok());
    match generate_report(state.upstream.clone(), &state.config, workspace_id).await {
        Ok(report) => (StatusCode::OK, Json(json!({ "data": report }))),
        Err(e) => {
            counter!("report_failures_total").increment(1);
            error!(error = %e, "report generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to generate report" })),
            )
        }
    }
}
