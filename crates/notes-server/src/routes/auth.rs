//! Authentication routes: register, login, logout.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use notes_store::{NewUser, Role, UserRow};
use serde::{Deserialize, Serialize};

use crate::auth::{self, AuthenticatedUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validate::Validator;

/// Sent for every login failure, whatever the cause.
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid credentials";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    /// `USER` or `ADMIN`, any case. Defaults to `USER`.
    #[serde(default)]
    pub role: Option<String>,
}

impl RegisterRequest {
    /// Strip surrounding whitespace from the identity fields.
    ///
    /// Validation and storage both see the trimmed values.
    fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            ..self
        }
    }

    /// Check every field, returning the parsed role on success.
    fn validate(&self) -> ApiResult<Role> {
        let mut v = Validator::new();
        v.length("username", &self.username, 3, 100)
            .email("email", &self.email)
            .length("password", &self.password, 8, usize::MAX)
            .length("fullName", &self.full_name, 3, 255);

        let role = match self.role.as_deref().filter(|r| !r.is_empty()) {
            None => Role::default(),
            Some(raw) => raw.parse::<Role>().unwrap_or_else(|_| {
                v.fail("role", "role must be one of USER, ADMIN");
                Role::default()
            }),
        };

        v.finish()?;
        Ok(role)
    }
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: UserRow,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub data: UserData,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub token: String,
    pub expires_in_hours: u64,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub status: &'static str,
    pub message: &'static str,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(request) = payload?;
    let request = request.normalized();
    let role = request.validate()?;

    let password_hash = auth::hash_password(&request.password)?;
    let new_user = NewUser::new(
        request.username,
        request.email,
        password_hash,
        request.full_name,
        role,
    );

    let user = state.store().insert_user(&new_user).await.map_err(|e| {
        if e.is_conflict() {
            ApiError::Conflict("Username or email already exists".to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    })?;

    tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            status: "success",
            message: "User created successfully",
            data: UserData { user },
        }),
    ))
}

/// POST /api/auth/login
///
/// Unknown user, missing identifier and wrong password are indistinguishable.
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload?;
    let invalid = || ApiError::Unauthorized(MSG_INVALID_CREDENTIALS.to_string());

    let username = request.username.as_deref().filter(|s| !s.is_empty());
    let email = request.email.as_deref().filter(|s| !s.is_empty());

    let user = match state.store().find_user_by_login(username, email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            auth::verify_against_dummy(&request.password);
            return Err(invalid());
        }
        Err(e) => {
            tracing::warn!(error = %e, "User lookup failed during login");
            auth::verify_against_dummy(&request.password);
            return Err(invalid());
        }
    };

    if !auth::verify_password(&request.password, &user.password_hash)? {
        tracing::info!(user_id = %user.id, "Login rejected");
        return Err(invalid());
    }

    let token = state.tokens().issue(user.id, &user.username, &user.role)?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok(Json(LoginResponse {
        status: "success",
        message: "Login successful",
        token,
        expires_in_hours: state.tokens().ttl().num_hours().unsigned_abs(),
    }))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client is expected to discard it.
async fn logout(user: AuthenticatedUser) -> Json<LogoutResponse> {
    tracing::info!(user_id = %user.user_id, username = %user.username, "User logged out");
    Json(LogoutResponse {
        status: "success",
        message: "Logged out successfully",
    })
}

/// Routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

/// Routes behind the auth gate.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/api/auth/logout", post(logout))
}
