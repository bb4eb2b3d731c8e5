//! Route definitions for the HTTP API.

pub mod auth;
pub mod health;
pub mod notes;

use axum::{Router, middleware::from_fn_with_state};

use crate::middleware::auth::require_auth;
use crate::state::AppState;

/// Build the complete router with all routes.
///
/// Notes and logout go through the auth gate; health, register and
/// login do not.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(notes::routes())
        .merge(auth::protected_routes())
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(health::routes())
        .merge(auth::public_routes())
        .merge(protected)
        .with_state(state)
}
