//! Server configuration from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use http::HeaderValue;

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins (comma-separated).
    pub cors_allowed_origins: String,
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: String,
    /// Session token lifetime in hours.
    pub jwt_expiry_hours: u64,
    /// Rate limiter refill rate (tokens per second).
    pub rate_limit_per_second: f64,
    /// Rate limiter bucket capacity.
    pub rate_limit_burst: u32,
    /// Upper bound for handling a whole request.
    pub request_timeout: Duration,
}

impl ServerConfig {
    pub const DEFAULT_PORT: u16 = 8750;
    pub const DEFAULT_CORS_ORIGIN: &'static str = "http://localhost:3000";
    pub const DEFAULT_JWT_EXPIRY_HOURS: u64 = 2;

    /// Configuration with default values and the given signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            log_level: "info".to_string(),
            cors_allowed_origins: Self::DEFAULT_CORS_ORIGIN.to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiry_hours: Self::DEFAULT_JWT_EXPIRY_HOURS,
            rate_limit_per_second: 10.0,
            rate_limit_burst: 20,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `JWT_SECRET`: Token signing secret
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 8750)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "http://localhost:3000")
    /// - `JWT_EXPIRY_HOURS`: Token lifetime (default: 2)
    /// - `RATE_LIMIT_PER_SECOND`: Bucket refill rate (default: 10)
    /// - `RATE_LIMIT_BURST`: Bucket capacity (default: 20)
    /// - `REQUEST_TIMEOUT_SECS`: Per-request timeout (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        let defaults = Self::new(jwt_secret);

        let config = Self {
            port: parse_var("PORT", defaults.port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or(defaults.cors_allowed_origins),
            jwt_expiry_hours: parse_var("JWT_EXPIRY_HOURS", defaults.jwt_expiry_hours)?,
            rate_limit_per_second: parse_var(
                "RATE_LIMIT_PER_SECOND",
                defaults.rate_limit_per_second,
            )?,
            rate_limit_burst: parse_var("RATE_LIMIT_BURST", defaults.rate_limit_burst)?,
            request_timeout: Duration::from_secs(parse_var(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            jwt_secret: defaults.jwt_secret,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and that the CORS origins parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rate_limit_per_second.is_finite() && self.rate_limit_per_second > 0.0) {
            return Err(ConfigError::InvalidValue {
                name: "RATE_LIMIT_PER_SECOND".to_string(),
                reason: "must be a positive number".to_string(),
            });
        }
        if self.rate_limit_burst == 0 {
            return Err(ConfigError::InvalidValue {
                name: "RATE_LIMIT_BURST".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.jwt_expiry_hours == 0 {
            return Err(ConfigError::InvalidValue {
                name: "JWT_EXPIRY_HOURS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "REQUEST_TIMEOUT_SECS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        self.cors_origins()?;
        Ok(())
    }

    /// Parse the comma-separated CORS origins into header values.
    pub fn cors_origins(&self) -> Result<Vec<HeaderValue>, ConfigError> {
        self.cors_allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                if origin == "*" {
                    return Err(ConfigError::InvalidValue {
                        name: "CORS_ALLOWED_ORIGINS".to_string(),
                        reason: "wildcard origin cannot be combined with credentials".to_string(),
                    });
                }
                origin.parse().map_err(|_| ConfigError::InvalidValue {
                    name: "CORS_ALLOWED_ORIGINS".to_string(),
                    reason: format!("invalid origin {:?}", origin),
                })
            })
            .collect()
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("rate_limit_per_second", &self.rate_limit_per_second)
            .field("rate_limit_burst", &self.rate_limit_burst)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}
