#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use stxry_api::auth::jwt::{generate_access_token, JwtConfig};
use stxry_api::config::ServerConfig;
use stxry_api::router::build_app_router;
use stxry_api::state::AppState;
use stxry_core::types::DbId;
use stxry_narrative::{Continuation, ContinuationGenerator, ContinuationRequest, NarrativeError};

/// Canned continuation generator so tests never reach for the network.
pub struct StubGenerator;

#[async_trait]
impl ContinuationGenerator for StubGenerator {
    async fn generate(
        &self,
        request: &ContinuationRequest,
    ) -> Result<Continuation, NarrativeError> {
        Ok(Continuation {
            title: format!("Chapter {}", request.next_chapter_number),
            content: format!(
                "Following \"{}\", the story presses on.",
                request.winning_action
            ),
            choices: vec!["Press on".to_string(), "Take stock".to_string()],
        })
    }
}

/// A generator that always fails, for exercising the abort path.
pub struct FailingGenerator;

#[async_trait]
impl ContinuationGenerator for FailingGenerator {
    async fn generate(
        &self,
        _request: &ContinuationRequest,
    ) -> Result<Continuation, NarrativeError> {
        Err(NarrativeError::InvalidContinuation(
            "stubbed failure".to_string(),
        ))
    }
}

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        round_duration_hours: 24,
        resolution_poll_secs: 60,
        narrative_api_url: "http://localhost:9090".to_string(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with the production middleware stack,
/// a stub continuation generator, and the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_generator(pool, Arc::new(StubGenerator))
}

/// Like [`build_test_app`] but with a caller-chosen generator.
pub fn build_test_app_with_generator(
    pool: PgPool,
    generator: Arc<dyn ContinuationGenerator>,
) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        generator,
    };
    build_app_router(state, &config)
}

/// Mint a bearer token for a user with the given role.
pub fn token_for(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).expect("token generation")
}

/// Insert a user row, returning its id.
pub async fn seed_user(pool: &PgPool, username: &str) -> DbId {
    stxry_db::repositories::UserRepo::create(pool, username)
        .await
        .expect("seed user")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Assert status and return the parsed body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
