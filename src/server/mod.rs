//! HTTP surface: one multipart caption route plus a health probe.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::app::App;
use crate::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub fn build_router(app: Arc<App>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/gerar_legenda", post(handlers::generate_caption))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

/// Bind `host:port` and serve until the process is stopped.
pub async fn serve(app: Arc<App>, host: &str, port: u16, max_upload_bytes: usize) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(app, max_upload_bytes)).await?;
    Ok(())
}
