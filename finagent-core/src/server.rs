//! HTTP surface expected by the hosting runtime.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::agent::AgentError;
use crate::handler::{InvocationHandler, InvocationRequest, InvocationResponse};

pub fn create_router(handler: InvocationHandler) -> Router {
    Router::new()
        .route("/invocations", post(invocations))
        .route("/ping", get(ping))
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

async fn invocations(
    State(handler): State<InvocationHandler>,
    Json(request): Json<InvocationRequest>,
) -> Result<Json<InvocationResponse>, InvocationErrorResponse> {
    handler
        .invoke(request)
        .await
        .map(Json)
        .map_err(InvocationErrorResponse)
}

async fn ping() -> Json<Value> {
    Json(json!({ "status": "Healthy" }))
}

struct InvocationErrorResponse(AgentError);

impl IntoResponse for InvocationErrorResponse {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Invocation failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// Serve until Ctrl-C.
pub async fn serve(handler: InvocationHandler, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(handler))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
