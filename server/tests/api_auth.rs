//! HTTP surface tests: authentication and role gating

use std::sync::Arc;

use axum::body::Body;
use http::{Request, StatusCode, header};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tower::ServiceExt;

use mesa_server::auth::{JwtConfig, JwtService, Role};
use mesa_server::core::{Config, ServerState, build_router};
use mesa_server::db::define_schema;

async fn test_state() -> ServerState {
    let db = Surreal::new::<Mem>(()).await.expect("in-memory db");
    db.use_ns("mesa").use_db("pos").await.expect("ns/db");
    define_schema(&db).await.expect("schema");

    let jwt_config = JwtConfig {
        secret: "integration-test-secret-key-0123456789abcdef".to_string(),
        expiration_minutes: 60,
        issuer: "mesa-server".to_string(),
        audience: "mesa-clients".to_string(),
    };
    let mut config = Config::with_overrides("/tmp/mesa-test", 0);
    config.jwt = jwt_config.clone();

    ServerState::new(config, db, Arc::new(JwtService::with_config(jwt_config)))
}

fn token_for(state: &ServerState, role: Role) -> String {
    state
        .jwt_service
        .generate_token("user:test", "tester", role)
        .expect("token")
}

fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    builder.body(Body::empty()).expect("request")
}

fn post_json(path: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn health_is_public() {
    let app = build_router(test_state().await);
    let response = app.oneshot(get("/api/health", None)).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_routes_require_a_token() {
    let app = build_router(test_state().await);
    let response = app.oneshot(get("/api/tables", None)).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let app = build_router(test_state().await);
    let response = app
        .oneshot(get("/api/tables", Some("not-a-jwt")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn any_staff_role_can_read_tables() {
    let state = test_state().await;
    let token = token_for(&state, Role::Waiter);
    let app = build_router(state);

    let response = app
        .oneshot(get("/api/tables", Some(&token)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn waiters_cannot_manage_taxes() {
    let state = test_state().await;
    let token = token_for(&state, Role::Waiter);
    let app = build_router(state);

    let response = app
        .oneshot(post_json(
            "/api/taxes",
            Some(&token),
            serde_json::json!({"name": "GST", "percentage": 5.0}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn managers_can_manage_taxes() {
    let state = test_state().await;
    let token = token_for(&state, Role::Manager);
    let app = build_router(state);

    let response = app
        .oneshot(post_json(
            "/api/taxes",
            Some(&token),
            serde_json::json!({"name": "GST", "percentage": 5.0}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn any_staff_role_can_generate_and_view_bills() {
    let state = test_state().await;
    let token = token_for(&state, Role::Waiter);
    let app = build_router(state);

    // Table does not exist, so the engine answers 404 (after passing auth)
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/billing/generate",
            Some(&token),
            serde_json::json!({"table_id": "dining_table:none"}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Same for bill detail and receipt: 404 for a missing bill, never 403
    let response = app
        .clone()
        .oneshot(get("/api/billing/bill:none", Some(&token)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get("/api/billing/bill:none/receipt", Some(&token)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn waiters_cannot_browse_the_bill_ledger() {
    let state = test_state().await;
    let token = token_for(&state, Role::Waiter);
    let app = build_router(state);

    let response = app
        .oneshot(get("/api/billing", Some(&token)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn waiters_cannot_take_payments() {
    let state = test_state().await;
    let token = token_for(&state, Role::Waiter);
    let app = build_router(state);

    let response = app
        .oneshot(post_json(
            "/api/billing/bill:none/payment",
            Some(&token),
            serde_json::json!({"payment_mode": "CASH"}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cashiers_can_take_payments() {
    let state = test_state().await;
    let token = token_for(&state, Role::Cashier);
    let app = build_router(state);

    // Bill does not exist, so auth passes and the engine answers 404
    let response = app
        .oneshot(post_json(
            "/api/billing/bill:none/payment",
            Some(&token),
            serde_json::json!({"payment_mode": "CASH"}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
