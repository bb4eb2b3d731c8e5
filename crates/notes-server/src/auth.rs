//! Authentication module: session token service and password hashing.

use std::fmt;
use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Client-facing message when no Authorization header is sent.
pub const MSG_MISSING_TOKEN: &str = "Unauthorized! Please login.";
/// Client-facing message when the header is not `Bearer <token>`.
pub const MSG_BAD_FORMAT: &str = "Invalid token format";
/// Client-facing message for any token that fails verification.
pub const MSG_INVALID_TOKEN: &str = "Invalid token. Unauthorized.";

/// JWT claims.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User ID.
    pub user_id: Uuid,
    /// Username at issuance time.
    pub username: String,
    /// User role ("admin" or "user").
    pub role: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration time (unix timestamp).
    pub exp: i64,
}

/// Token service errors.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// No signing secret was configured.
    #[error("token signing secret is not configured")]
    MissingSecret,

    /// The configured lifetime does not fit in a timestamp.
    #[error("token lifetime of {0} hours is out of range")]
    InvalidLifetime(u64),

    /// The token could not be signed.
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Bad signature, malformed token, wrong algorithm or expired.
    #[error("invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken(e) => {
                tracing::debug!(error = %e, "Token verification failed");
                ApiError::Unauthorized(MSG_INVALID_TOKEN.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Issues and verifies HMAC-signed session tokens.
///
/// Tokens are stateless; there is no server-side revocation.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service signing with `secret`, issuing tokens valid for `ttl_hours`.
    pub fn new(secret: &str, ttl_hours: u64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        let ttl = i64::try_from(ttl_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or(TokenError::InvalidLifetime(ttl_hours))?;

        // Only the HMAC family is accepted; anything else in the header is rejected.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    /// Create a token service from server configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, TokenError> {
        Self::new(&config.jwt_secret, config.jwt_expiry_hours)
    }

    /// Lifetime of newly issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for a user, valid from now.
    pub fn issue(&self, user_id: Uuid, username: &str, role: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, username, role, Utc::now())
    }

    /// Issue a token as if it were signed at `issued_at`.
    pub fn issue_at(
        &self,
        user_id: Uuid,
        username: &str,
        role: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            user_id,
            username: username.to_string(),
            role: role.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    /// Verify signature, algorithm and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::InvalidToken)
    }

    /// Run the bearer-token checks against request headers.
    ///
    /// Each rejection carries only a generic message; the cause is logged.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, ApiError> {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Err(ApiError::Unauthorized(MSG_MISSING_TOKEN.to_string()));
        };

        let token = value
            .to_str()
            .ok()
            .and_then(bearer_token)
            .ok_or_else(|| ApiError::Unauthorized(MSG_BAD_FORMAT.to_string()))?;

        Ok(self.verify(token)?)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Split `Bearer <token>` into the token part.
///
/// Exactly two space-separated parts are required, the first being `Bearer`.
fn bearer_token(header_value: &str) -> Option<&str> {
    let mut parts = header_value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(password_hash.to_string())
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Argon2 hash of a throwaway password, computed once.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("dummy password for unknown accounts").ok());

/// Spend the same Argon2 work as a real verification, then fail.
///
/// Used when no account matched so response timing does not reveal
/// whether a username or email exists.
pub fn verify_against_dummy(password: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}

/// Authenticated user extracted from the verified session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID.
    pub user_id: Uuid,
    /// Username.
    pub username: String,
    /// User role.
    pub role: String,
}

impl AuthenticatedUser {
    /// Check if user is admin.
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            role: claims.role,
        }
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    /// Uses the claims left by the auth gate, verifying the header
    /// directly when the route is not behind the gate.
    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(claims.clone().into());
        }

        state.tokens().authenticate(&parts.headers).map(Into::into)
    }
}
