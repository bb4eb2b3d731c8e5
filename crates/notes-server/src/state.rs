//! Application state shared across handlers.

use std::sync::Arc;

use notes_store::Store;

use crate::auth::{TokenError, TokenService};
use crate::config::ServerConfig;
use crate::rate_limit::RateLimiter;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Database store.
    store: Arc<Store>,
    /// Server configuration.
    config: Arc<ServerConfig>,
    /// Session token issuer/verifier.
    tokens: Arc<TokenService>,
    /// Global request rate limiter.
    limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Create new application state.
    ///
    /// Fails if the configured signing secret is unusable.
    pub fn new(store: Store, config: ServerConfig) -> Result<Self, TokenError> {
        let tokens = TokenService::from_config(&config)?;
        let limiter = RateLimiter::new(config.rate_limit_per_second, config.rate_limit_burst);
        tracing::info!(
            rate_per_second = limiter.rate(),
            burst = limiter.burst(),
            token_ttl_hours = tokens.ttl().num_hours(),
            "Request limits configured"
        );
        Ok(Self::with_parts(store, config, tokens, limiter))
    }

    /// Assemble state from already-built components.
    pub fn with_parts(
        store: Store,
        config: ServerConfig,
        tokens: TokenService,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            limiter: Arc::new(limiter),
        }
    }

    /// Get a reference to the database store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get a reference to the token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Get a reference to the rate limiter.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}
