//! notes-server: HTTP API for notes and user accounts
//!
//! This crate provides:
//! - Note CRUD and search endpoints under `/api/notes`
//! - Registration, login and logout under `/api/auth`
//! - Bearer-token authentication (HMAC-signed JWT)
//! - A global token-bucket rate limiter
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request ID generation and propagation
//! - Request logging
//! - Whole-request timeouts
//! - CORS handling
//! - Rate limiting
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use notes_server::{AppState, ServerConfig, app::build_app};
//! use notes_store::{Store, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::from_env()?;
//!     let store = Store::connect(StoreConfig::from_env()?).await?;
//!     let app = build_app(AppState::new(store, config.clone())?)?;
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod validate;

// Re-exports for convenience
pub use auth::{AuthenticatedUser, Claims, TokenError, TokenService};
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use rate_limit::RateLimiter;
pub use state::AppState;

// Re-export dependent crates
pub use notes_store;
