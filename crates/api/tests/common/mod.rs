//! Shared harness for HTTP-level integration tests.
//!
//! Requests go straight to the router through `tower::ServiceExt::oneshot`,
//! with no TCP listener.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use sources_api::auth::jwt::{generate_access_token, JwtConfig};
use sources_api::config::ServerConfig;
use sources_api::router::build_app_router;
use sources_api::state::AppState;
use sources_core::thumbnail::DisabledQueue;
use sources_db::hooks::SourceHooks;
use sources_db::models::user::CreateUser;
use sources_db::repositories::UserRepo;

pub fn test_jwt() -> JwtConfig {
    JwtConfig {
        secret: "sources-integration-test-secret".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: test_jwt(),
        sources_enabled: true,
        thumbnails_enabled: true,
        explore_base_url: "/explore".to_string(),
        thumbnail_claim_timeout_secs: 300,
    }
}

/// Full application router over `pool`, with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    // Hook-driven enqueues are dropped so no spawned task outlives the test.
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        hooks: SourceHooks::standard(Arc::new(DisabledQueue)),
    };
    build_app_router(state, &config)
}

/// Create a user row and return its id with a valid bearer token.
pub async fn login_as(pool: &PgPool, username: &str, role: &str) -> (i64, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap();
    let token = generate_access_token(user.id, &user.role, &test_jwt()).unwrap();
    (user.id, token)
}

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

pub async fn post_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
