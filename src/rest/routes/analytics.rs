// rest/routes/analytics.rs — analytics REST routes.
//
// Failures are reported as a JSON `{"error": ...}` body with HTTP 200, so
// thin dashboard clients only ever parse one shape.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::{analytics, AppContext};

/// Run the scrape-and-score pipeline now and return the fresh reports.
///
/// Long-running: a full run over all keywords takes minutes. Concurrent
/// callers queue on the run lock inside `analytics::run_all`.
pub async fn get_analytics(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    if ctx.config.credentials.is_none() {
        return Json(json!({
            "error": "Twitter credentials not configured. Please set environment variables."
        }));
    }

    match analytics::run_all(&ctx).await {
        Ok(reports) => Json(serde_json::to_value(&reports).unwrap_or_else(|_| json!([]))),
        Err(e) => {
            warn!(err = %e, "on-demand analytics run failed");
            Json(json!({ "error": format!("Failed to get analytics: {e}") }))
        }
    }
}

/// Return the most recent stored snapshot.
pub async fn get_last_analytics(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    match ctx.analytics.latest_snapshot().await {
        Ok(Some(snapshot)) => {
            Json(serde_json::to_value(&snapshot).unwrap_or_else(|_| json!({})))
        }
        Ok(None) => Json(json!({ "error": "No analytics data found" })),
        Err(e) => {
            warn!(err = %e, "failed to load latest snapshot");
            Json(json!({ "error": format!("Database error: {e}") }))
        }
    }
}
