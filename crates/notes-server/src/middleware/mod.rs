//! Middleware making up the request pipeline.
//!
//! Outermost first: request id, request logging, timeout, CORS,
//! rate limiting, and (protected routes only) the auth gate.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod request_log;
