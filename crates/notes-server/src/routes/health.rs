//! Health check endpoint.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Message returned by the health check.
pub const HEALTH_MESSAGE: &str = "Notes server running!";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    pub message: &'static str,
}

/// GET /api/healthchecker
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: HEALTH_MESSAGE,
    })
}

/// Build health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/healthchecker", get(health_check))
}
