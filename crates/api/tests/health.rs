//! Integration tests for the health check endpoint and the auth boundary.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, seed_admin, seed_client};
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app.app(), "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["storage_healthy"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app.app(), "/this-route-does-not-exist", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app.app(), "/api/v1/me/form", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app.app(), "/api/v1/notifications", Some("not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn token_without_profile_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = intake_api::auth::jwt::issue_token(
        Uuid::new_v4(),
        None,
        3600,
        &app.state.config.jwt,
    )
    .unwrap();

    let response = get(app.app(), "/api/v1/notifications", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn roles_are_enforced_both_ways(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let client = seed_client(&app, &admin, "Acme Rides").await;

    let response = get(app.app(), "/api/v1/admin/clients", Some(&client.token)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(app.app(), "/api/v1/me/form", Some(&admin.token)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
