use crate::AppContext;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let uptime = ctx.started_at.elapsed().as_secs();
    let db_ok = ctx.storage.ping().await.is_ok();
    Json(json!({
        "status": if db_ok { "healthy" } else { "degraded" },
        "keywords": ctx.config.keywords,
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": uptime,
    }))
}
