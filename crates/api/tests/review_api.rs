//! The review cycle: approve, reject, corrections and post-review edits.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, patch_json, post_empty, post_json, seed_admin, seed_client};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn notices(app: &common::TestApp, token: &str) -> Vec<Value> {
    let response = get(app.app(), "/api/v1/notifications", Some(token)).await;
    body_json(response).await["data"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

fn count_kind(notices: &[Value], kind: &str) -> usize {
    notices.iter().filter(|n| n["kind"] == kind).count()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approve_without_body(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let client = seed_client(&app, &admin, "Acme Rides").await;

    let response = post_empty(
        app.app(),
        &format!("/api/v1/admin/forms/{}/approve", client.form_id()),
        &admin.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let form = &body_json(response).await["data"];
    assert_eq!(form["review_status"], "approved");
    assert_eq!(form["reviewed_by"], admin.profile.id);
    assert!(form["reviewed_at"].is_string());
    // Far from complete, so no promotion.
    assert_eq!(form["progress_percentage"], 0);

    let client_notices = notices(&app, &client.token).await;
    assert_eq!(count_kind(&client_notices, "form_completed"), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approve_promotes_near_complete_form(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let client = seed_client(&app, &admin, "Acme Rides").await;

    sqlx::query("UPDATE app_forms SET progress_percentage = 96, status = 'in_progress' WHERE id = $1")
        .bind(client.form_id())
        .execute(app.pool())
        .await
        .unwrap();

    let response = post_json(
        app.app(),
        &format!("/api/v1/admin/forms/{}/approve", client.form_id()),
        &admin.token,
        json!({ "feedback": "  Looks great  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let form = &body_json(response).await["data"];
    assert_eq!(form["progress_percentage"], 100);
    assert_eq!(form["status"], "completed");
    assert_eq!(form["review_feedback"], "Looks great");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reject_requires_feedback(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let client = seed_client(&app, &admin, "Acme Rides").await;
    let uri = format!("/api/v1/admin/forms/{}/reject", client.form_id());

    let response = post_json(app.app(), &uri, &admin.token, json!({ "feedback": "   " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(
        app.app(),
        &format!("/api/v1/admin/forms/{}", client.form_id()),
        Some(&admin.token),
    )
    .await;
    let form = &body_json(response).await["data"];
    assert_eq!(form["review_status"], "pending");
    assert!(notices(&app, &client.token).await.is_empty());

    let response = post_json(
        app.app(),
        &uri,
        &admin.token,
        json!({ "feedback": "Logo is blurry" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let form = &body_json(response).await["data"];
    assert_eq!(form["review_status"], "rejected");
    assert_eq!(form["review_feedback"], "Logo is blurry");

    let client_notices = notices(&app, &client.token).await;
    assert_eq!(count_kind(&client_notices, "form_updated"), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_of_unknown_form_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;

    let response = post_empty(app.app(), "/api/v1/admin/forms/999999/approve", &admin.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_corrections_only_after_rejection(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let client = seed_client(&app, &admin, "Acme Rides").await;

    let response = post_empty(
        app.app(),
        "/api/v1/me/form/corrections-complete",
        &client.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_corrections_complete_notifies_admins_once(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let client = seed_client(&app, &admin, "Acme Rides").await;

    post_json(
        app.app(),
        &format!("/api/v1/admin/forms/{}/reject", client.form_id()),
        &admin.token,
        json!({ "feedback": "Fix the terms" }),
    )
    .await;

    for _ in 0..2 {
        let response = post_empty(
            app.app(),
            "/api/v1/me/form/corrections-complete",
            &client.token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let form = &body_json(response).await["data"];
        assert_eq!(form["corrections_completed"], true);
        assert!(form["corrections_completed_at"].is_string());
    }

    let admin_notices = notices(&app, &admin.token).await;
    assert_eq!(count_kind(&admin_notices, "corrections_completed"), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_post_review_edit_notifies_once_per_review(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let client = seed_client(&app, &admin, "Acme Rides").await;
    let reject_uri = format!("/api/v1/admin/forms/{}/reject", client.form_id());

    post_json(
        app.app(),
        &reject_uri,
        &admin.token,
        json!({ "feedback": "Fix the terms" }),
    )
    .await;
    post_empty(
        app.app(),
        "/api/v1/me/form/corrections-complete",
        &client.token,
    )
    .await;

    let response = patch_json(
        app.app(),
        "/api/v1/me/form",
        &client.token,
        json!({ "driver_terms": "New terms" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let form = &body_json(response).await["data"];
    assert_eq!(form["admin_notified_of_changes"], true);
    // An edit after acknowledging withdraws the acknowledgment.
    assert_eq!(form["corrections_completed"], false);

    patch_json(
        app.app(),
        "/api/v1/me/form",
        &client.token,
        json!({ "passenger_terms": "New terms" }),
    )
    .await;

    let updates = |n: &[Value]| {
        n.iter()
            .filter(|n| n["message"].as_str().unwrap_or("").contains("after review"))
            .count()
    };
    let before = notices(&app, &admin.token).await;
    assert_eq!(updates(&before), 1);

    // A fresh review re-arms the notice.
    post_json(
        app.app(),
        &reject_uri,
        &admin.token,
        json!({ "feedback": "Still not right" }),
    )
    .await;
    patch_json(
        app.app(),
        "/api/v1/me/form",
        &client.token,
        json!({ "driver_terms": "Newer terms" }),
    )
    .await;
    let after = notices(&app, &admin.token).await;
    assert_eq!(updates(&after), 2);
}
