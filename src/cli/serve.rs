//! HTTP front for the chat relay: `POST /ask` plus the static assistant page.

use crate::core::chat::{AskRequest, AskResponse, ChatRelay, Reply};
use crate::core::config::ServerConfig;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(relay: Arc<ChatRelay>, config: &ServerConfig) -> Router {
    let static_service =
        ServeDir::new(&config.static_dir).fallback(ServeFile::new(config.index_path()));
    Router::new()
        .route("/ask", post(ask))
        .with_state(relay)
        .fallback_service(static_service)
        .layer(TraceLayer::new_for_http())
}

async fn ask(
    State(relay): State<Arc<ChatRelay>>,
    Json(request): Json<AskRequest>,
) -> (StatusCode, Json<AskResponse>) {
    let reply = relay.ask(&request).await;
    let status = match reply {
        Reply::NoQuestion => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    };
    (
        status,
        Json(AskResponse {
            answer: reply.text().to_string(),
        }),
    )
}

pub async fn run(relay: Arc<ChatRelay>, config: &ServerConfig) -> Result<()> {
    let app = router(relay, config);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Server running at http://{}", config.listen_addr);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
