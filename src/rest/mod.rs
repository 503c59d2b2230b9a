// rest/mod.rs — Public REST API server.
//
// Axum HTTP server on port 8000, bound to all interfaces by default —
// the container contract: one TCP port serving the analytics API.
//
// Endpoints:
//   GET  /analytics        (run the pipeline now, return the reports)
//   GET  /last-analytics   (most recent stored snapshot)
//   GET  /health

pub mod routes;

use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/analytics", get(routes::analytics::get_analytics))
        .route("/last-analytics", get(routes::analytics::get_last_analytics))
        .route("/health", get(routes::health::health))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
