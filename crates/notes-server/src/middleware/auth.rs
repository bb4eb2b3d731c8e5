//! Auth gate for protected routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiResult;
use crate::state::AppState;

/// Verify the bearer token and hand the claims to the handler.
///
/// Missing header, wrong scheme and invalid or expired tokens all
/// short-circuit with 401 before the handler runs.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let claims = state.tokens().authenticate(request.headers())?;
    tracing::debug!(user_id = %claims.user_id, "Request authenticated");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
