//! Router plus the full middleware stack.

use axum::{
    Router,
    http::{Method, StatusCode, header},
    middleware::{from_fn, from_fn_with_state},
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

use crate::config::{ConfigError, ServerConfig};
use crate::middleware::{
    rate_limit::enforce_rate_limit,
    request_id::{propagate_request_id_layer, set_request_id_layer},
    request_log::log_requests,
};
use crate::routes;
use crate::state::AppState;

/// Build CORS layer from configuration.
pub fn build_cors_layer(config: &ServerConfig) -> Result<CorsLayer, ConfigError> {
    Ok(CorsLayer::new()
        .allow_origin(config.cors_origins()?)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::ORIGIN,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .allow_credentials(true))
}

/// Assemble the application.
///
/// Outermost first: request id, propagate id, request log, timeout,
/// CORS, rate limit, then the routes (auth gate applied per route).
pub fn build_app(state: AppState) -> Result<Router, ConfigError> {
    let config = state.config().clone();
    let cors = build_cors_layer(&config)?;

    Ok(routes::build_router(state.clone())
        .layer(from_fn_with_state(state, enforce_rate_limit))
        .layer(cors)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(from_fn(log_requests))
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{HeaderValue, Request, StatusCode};
    use http_body_util::BodyExt;
    use notes_store::{Store, StoreConfig};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::auth::{MSG_BAD_FORMAT, MSG_INVALID_TOKEN, MSG_MISSING_TOKEN, TokenService};
    use crate::middleware::request_id::REQUEST_ID_HEADER;
    use crate::rate_limit::RateLimiter;
    use crate::routes::health::HEALTH_MESSAGE;

    const SECRET: &str = "router_test_secret";

    /// State whose store never connects; only paths that stop before
    /// the database can be exercised.
    fn test_state(burst: u32) -> AppState {
        let store_config = StoreConfig {
            min_connections: 0,
            acquire_timeout: Duration::from_millis(200),
            ..StoreConfig::default()
        };
        let store = Store::connect_lazy(&store_config).unwrap();
        let config = ServerConfig::new(SECRET);
        let tokens = TokenService::new(SECRET, 2).unwrap();
        let limiter = RateLimiter::new(1.0, burst);
        AppState::with_parts(store, config, tokens, limiter)
    }

    fn app(burst: u32) -> (Router, AppState) {
        let state = test_state(burst);
        (build_app(state.clone()).unwrap(), state)
    }

    fn bearer(state: &AppState) -> String {
        let token = state
            .tokens()
            .issue(Uuid::new_v4(), "ada", "user")
            .unwrap();
        format!("Bearer {token}")
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn get_with_auth(uri: &str, auth: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, auth)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (app, _) = app(10);
        let response = app.oneshot(get("/api/healthchecker")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], HEALTH_MESSAGE);
    }

    #[tokio::test]
    async fn test_response_carries_request_id() {
        let (app, _) = app(10);
        let response = app.oneshot(get("/api/healthchecker")).await.unwrap();

        let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_client_request_id_is_echoed() {
        let (app, _) = app(10);
        let request = Request::builder()
            .uri("/api/healthchecker")
            .header(REQUEST_ID_HEADER, "trace-42")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER),
            Some(&HeaderValue::from_static("trace-42"))
        );
    }

    #[tokio::test]
    async fn test_notes_require_auth_header() {
        let (app, _) = app(10);
        let response = app.oneshot(get("/api/notes")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], MSG_MISSING_TOKEN);
    }

    #[tokio::test]
    async fn test_trailing_slash_is_gated_too() {
        let (app, _) = app(10);
        let response = app.oneshot(get("/api/notes/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_rejected() {
        let (app, _) = app(10);
        let response = app
            .oneshot(get_with_auth("/api/notes", "Basic YWRhOnB3"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], MSG_BAD_FORMAT);
    }

    #[tokio::test]
    async fn test_malformed_token_rejected() {
        let (app, _) = app(10);
        let response = app
            .oneshot(get_with_auth("/api/notes", "Bearer not.a.jwt"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], MSG_INVALID_TOKEN);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let (app, state) = app(10);
        let issued = chrono::Utc::now() - chrono::Duration::hours(3);
        let token = state
            .tokens()
            .issue_at(Uuid::new_v4(), "ada", "user", issued)
            .unwrap();

        let response = app
            .oneshot(get_with_auth("/api/notes", &format!("Bearer {token}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], MSG_INVALID_TOKEN);
    }

    #[tokio::test]
    async fn test_token_from_other_secret_rejected() {
        let (app, _) = app(10);
        let other = TokenService::new("some_other_secret", 2).unwrap();
        let token = other.issue(Uuid::new_v4(), "ada", "user").unwrap();

        let response = app
            .oneshot(get_with_auth("/api/notes", &format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_requires_token() {
        let (app, _) = app(10);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/logout")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_with_token_succeeds() {
        let (app, state) = app(10);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/logout")
            .header(header::AUTHORIZATION, bearer(&state))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Logged out successfully");
    }

    #[tokio::test]
    async fn test_bad_pagination_is_bad_request() {
        let (app, state) = app(10);
        let response = app
            .oneshot(get_with_auth("/api/notes?page=abc", &bearer(&state)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Invalid page parameter");
    }

    #[tokio::test]
    async fn test_huge_pagination_is_bad_request() {
        let (app, state) = app(10);
        let response = app
            .oneshot(get_with_auth(
                "/api/notes?page=4294967295&limit=4294967295",
                &bearer(&state),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Invalid page parameter");
    }

    #[tokio::test]
    async fn test_non_uuid_note_id_is_not_found() {
        let (app, state) = app(10);
        let response = app
            .oneshot(get_with_auth("/api/notes/12345", &bearer(&state)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await["message"],
            "No note with that ID exists"
        );
    }

    #[tokio::test]
    async fn test_create_note_validation() {
        let (app, state) = app(10);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/notes/")
            .header(header::AUTHORIZATION, bearer(&state))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title":"","content":""}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (app, state) = app(10);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/notes")
            .header(header::AUTHORIZATION, bearer(&state))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_validation_runs_before_store() {
        let (app, _) = app(10);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"username":"al","email":"nope","password":"short","fullName":"Al","role":"ROOT"}"#,
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["errors"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_login_without_identifier_is_unauthorized() {
        let (app, _) = app(10);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"password":"whatever1"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_rate_limit_rejects_after_burst() {
        let (app, _) = app(5);

        for _ in 0..5 {
            let response = app.clone().oneshot(get("/api/healthchecker")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(get("/api/healthchecker")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
        let body = json_body(response).await;
        assert_eq!(body["code"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_rate_limit_applies_before_auth() {
        let (app, _) = app(1);

        let first = app.clone().oneshot(get("/api/notes")).await.unwrap();
        assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

        let second = app.oneshot(get("/api/notes")).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let (app, _) = app(10);
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/notes")
            .header(header::ORIGIN, ServerConfig::DEFAULT_CORS_ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            ServerConfig::DEFAULT_CORS_ORIGIN
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_unknown_origin_gets_no_cors_grant() {
        let (app, _) = app(10);
        let request = Request::builder()
            .uri("/api/healthchecker")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }
}
