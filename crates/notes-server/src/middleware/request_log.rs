//! Request logging middleware.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use super::request_id::request_id;

/// Log method, path, status and latency for every request.
///
/// Runs outside the rest of the stack, so rejected requests
/// (rate limited, unauthorized, timed out) are logged too.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let request_id = request_id(request.headers()).unwrap_or("-").to_owned();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

    if response.status().is_server_error() {
        tracing::warn!(%method, %path, status, latency_ms, %request_id, "Received request");
    } else {
        tracing::info!(%method, %path, status, latency_ms, %request_id, "Received request");
    }

    response
}
