//! Rate limiting middleware backed by the shared token bucket.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::state::AppState;

/// Reject with 429 when the global bucket is empty.
///
/// No `Retry-After` header is sent.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.limiter().allow() {
        next.run(request).await
    } else {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "Rate limit exceeded"
        );
        ApiError::RateLimited.into_response()
    }
}
