/// Integration tests for the Botboard API
///
/// These exercise the full router: login, bearer-token enforcement, request
/// validation, and the export type check. None of them need a database:
/// the pool is lazy and the tested paths reject before querying. Report
/// endpoints themselves are covered by the `#[ignore]`d tests at the bottom
/// against a real PostgreSQL.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::TestContext;
use serde_json::json;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": username, "password": password }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_login_success() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(login_request("admin", common::TEST_PASSWORD))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["token"].is_string());
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["expires_in_seconds"], 8 * 3600);
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn test_login_token_is_accepted_by_protected_routes() {
    let ctx = TestContext::new();

    // Get a token through the real login flow
    let response = ctx
        .app
        .clone()
        .oneshot(login_request("admin", common::TEST_PASSWORD))
        .await
        .unwrap();
    let token = body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    // An invalid export type fails AFTER auth, so a 400 proves the token
    // passed the middleware
    let request = Request::builder()
        .method("GET")
        .uri("/api/export/csv?type=nonsense")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(login_request("admin", "not-the-password"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_login_wrong_username() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(login_request("root", common::TEST_PASSWORD))
        .await
        .unwrap();

    // Same response as a wrong password; the two are indistinguishable
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_empty_credentials() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(login_request("", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"].is_array());
}

#[tokio::test]
async fn test_protected_route_requires_auth() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/api/users/summary")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_rejects_non_bearer_scheme() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/api/users/summary")
        .header(header::AUTHORIZATION, "Basic YWRtaW46YWRtaW4=")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_route_rejects_invalid_token() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/api/users/summary")
        .header(header::AUTHORIZATION, "Bearer not.a.valid.token")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_rejects_token_signed_with_other_secret() {
    let ctx = TestContext::new();

    let claims = botboard_shared::auth::jwt::Claims::new("admin");
    let forged = botboard_shared::auth::jwt::create_token(
        &claims,
        "a-different-secret-that-is-also-32-bytes",
    )
    .unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/users/summary")
        .header(header::AUTHORIZATION, format!("Bearer {}", forged))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_export_invalid_type() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/api/export/csv?type=secrets")
        .header(header::AUTHORIZATION, ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_report_rejects_invalid_date_filter() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/api/users/summary?from=yesterday")
        .header(header::AUTHORIZATION, ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_security_headers_present() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert!(headers.get("Strict-Transport-Security").is_none());
}

/// DB-backed smoke test for the report endpoints.
///
/// Needs a running PostgreSQL and `DATABASE_URL`; run with
/// `cargo test -- --ignored`.
#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_reports_against_live_database() {
    use botboard_api::app::{build_router, AppState};
    use botboard_shared::db::{migrations, pool};

    let mut config = common::test_config();
    config.database.url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for DB-backed tests");

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: 5,
        ..Default::default()
    })
    .await
    .unwrap();
    migrations::run_migrations(&db).await.unwrap();

    let state = AppState::new(db, config.clone());
    let app = build_router(state);

    let claims = botboard_shared::auth::jwt::Claims::new(&config.admin.username);
    let token = botboard_shared::auth::jwt::create_token(&claims, &config.jwt.secret).unwrap();

    for uri in [
        "/api/overview",
        "/api/users/summary",
        "/api/conversations/summary",
        "/api/messages/peak-hours?from=2025-01-01&to=2025-12-31",
        "/api/menu/funnel",
        "/api/services/top?limit=5",
        "/api/export/csv?type=conversations",
        "/api/raw-events?limit=10",
    ] {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {} should succeed", uri);
    }
}
