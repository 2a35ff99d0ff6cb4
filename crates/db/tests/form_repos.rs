//! Repository-level tests for client accounts, forms, images and notices.

use chrono::{Duration, Utc};
use intake_core::image_catalog::{AppType, ImageKey, ImageType, StoreType};
use intake_core::notification::{KIND_FORM_UPDATED, KIND_INACTIVE_WARNING};
use intake_core::roles::{ROLE_ADMIN, ROLE_CLIENT};
use intake_db::models::activity_log::CreateActivityLog;
use intake_db::models::app_form::{ReviewUpdate, UpdateFormFields};
use intake_db::models::client::{ClientAccount, CreateClientAccount};
use intake_db::models::form_image::CreateFormImage;
use intake_db::models::profile::CreateProfile;
use intake_db::repositories::{
    ActivityLogRepo, AppFormRepo, ClientRepo, FormImageRepo, NotificationRepo, ProfileRepo,
};
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_admin(pool: &PgPool, email: &str) -> i64 {
    ProfileRepo::create(
        pool,
        &CreateProfile {
            auth_user_id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Admin".to_string(),
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn new_account(pool: &PgPool, name: &str, code: &str) -> ClientAccount {
    ClientRepo::create_account(
        pool,
        &CreateClientAccount {
            auth_user_id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            access_code: code.to_string(),
            created_by: None,
        },
    )
    .await
    .unwrap()
}

fn review(status: &str, feedback: Option<&str>, pct: i32, reviewer: i64) -> ReviewUpdate {
    ReviewUpdate {
        review_status: status.to_string(),
        review_feedback: feedback.map(str::to_string),
        progress_percentage: pct,
        status: "in_progress".to_string(),
        reviewed_by: reviewer,
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_account_writes_profile_client_and_form(pool: PgPool) {
    let account = new_account(&pool, "Acme Rides", "ABC-123-XYZ").await;

    assert_eq!(account.profile.role, ROLE_CLIENT);
    assert_eq!(account.client.profile_id, account.profile.id);
    assert_eq!(account.client.status, "active");
    assert_eq!(account.form.client_id, account.client.id);
    assert_eq!(account.form.status, "not_started");
    assert_eq!(account.form.progress_percentage, 0);
    assert_eq!(account.form.review_status, "pending");
    assert!(account.form.last_activity_date.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_access_code_rolls_back_everything(pool: PgPool) {
    new_account(&pool, "First", "AAA-111-AAA").await;

    let err = ClientRepo::create_account(
        &pool,
        &CreateClientAccount {
            auth_user_id: Uuid::new_v4(),
            name: "Second".to_string(),
            email: "second@example.com".to_string(),
            access_code: "AAA-111-AAA".to_string(),
            created_by: None,
        },
    )
    .await
    .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_clients_access_code"));

    let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(profiles, 1, "profile insert must roll back with the client");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_account_cascades(pool: PgPool) {
    let account = new_account(&pool, "Gone Soon", "DEL-000-ETE").await;
    let admin = new_admin(&pool, "admin@example.com").await;
    NotificationRepo::create_for_recipients(
        &pool,
        &[admin],
        Some(account.client.id),
        KIND_FORM_UPDATED,
        "hello",
    )
    .await
    .unwrap();

    assert!(ClientRepo::delete_account(&pool, account.client.id).await.unwrap());
    assert!(!ClientRepo::delete_account(&pool, account.client.id).await.unwrap());

    assert!(AppFormRepo::find_by_id(&pool, account.form.id).await.unwrap().is_none());
    assert!(ProfileRepo::find_by_id(&pool, account.profile.id).await.unwrap().is_none());
    assert_eq!(NotificationRepo::unread_count(&pool, admin).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_summaries_joins_form(pool: PgPool) {
    let account = new_account(&pool, "Listed", "LIS-TED-001").await;
    let rows = ClientRepo::list_summaries(&pool).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].form_id, Some(account.form.id));
    assert_eq!(rows[0].progress_percentage, Some(0));
}

// ---------------------------------------------------------------------------
// Form flags
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_fields_coalesces_and_stamps_activity(pool: PgPool) {
    let account = new_account(&pool, "Editor", "EDI-TOR-001").await;
    let now = Utc::now();

    let patch = UpdateFormFields {
        driver_app_name: Some("Acme Driver".to_string()),
        ..Default::default()
    };
    let form = AppFormRepo::update_fields(&pool, account.form.id, &patch, now)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(form.driver_app_name.as_deref(), Some("Acme Driver"));
    assert!(form.last_client_update.is_some());

    let patch = UpdateFormFields {
        support_email: Some("help@acme.test".to_string()),
        ..Default::default()
    };
    let form = AppFormRepo::update_fields(&pool, account.form.id, &patch, now)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(form.driver_app_name.as_deref(), Some("Acme Driver"));
    assert_eq!(form.support_email.as_deref(), Some("help@acme.test"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_change_notice_claimed_once_per_review(pool: PgPool) {
    let account = new_account(&pool, "Notice", "NOT-ICE-001").await;
    let admin = new_admin(&pool, "reviewer@example.com").await;
    let form_id = account.form.id;

    // Pending forms never claim.
    assert!(AppFormRepo::claim_change_notice(&pool, form_id).await.unwrap().is_none());

    AppFormRepo::apply_review(&pool, form_id, &review("rejected", Some("fix"), 50, admin))
        .await
        .unwrap()
        .unwrap();
    AppFormRepo::mark_corrections_complete(&pool, form_id, Utc::now())
        .await
        .unwrap()
        .unwrap();

    let claimed = AppFormRepo::claim_change_notice(&pool, form_id).await.unwrap().unwrap();
    assert!(claimed.admin_notified_of_changes);
    assert!(!claimed.corrections_completed);
    assert!(AppFormRepo::claim_change_notice(&pool, form_id).await.unwrap().is_none());

    // A new review re-arms the notice.
    let form = AppFormRepo::apply_review(&pool, form_id, &review("approved", None, 100, admin))
        .await
        .unwrap()
        .unwrap();
    assert!(!form.admin_notified_of_changes);
    assert_eq!(form.reviewed_by, Some(admin));
    assert!(form.reviewed_at.is_some());
    assert!(AppFormRepo::claim_change_notice(&pool, form_id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_corrections_only_on_rejected(pool: PgPool) {
    let account = new_account(&pool, "Fixer", "FIX-ER0-001").await;
    assert!(AppFormRepo::mark_corrections_complete(&pool, account.form.id, Utc::now())
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_quarter_milestone_claimed_once(pool: PgPool) {
    let account = new_account(&pool, "Quarter", "QUA-RTE-R01").await;
    assert!(!account.form.quarter_milestone_notified);

    let claimed = AppFormRepo::claim_quarter_milestone(&pool, account.form.id)
        .await
        .unwrap()
        .expect("first claim flips the flag");
    assert!(claimed.quarter_milestone_notified);
    assert_eq!(claimed.id, account.form.id);

    assert!(AppFormRepo::claim_quarter_milestone(&pool, account.form.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_status_completion_date(pool: PgPool) {
    let account = new_account(&pool, "Pipeline", "PIP-ELI-NE1").await;
    let form = AppFormRepo::update_project_status(&pool, account.form.id, "completed")
        .await
        .unwrap()
        .unwrap();
    assert!(form.completion_date.is_some());

    let form = AppFormRepo::update_project_status(&pool, account.form.id, "testing_app")
        .await
        .unwrap()
        .unwrap();
    assert!(form.completion_date.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_inactive_respects_cutoff_and_progress(pool: PgPool) {
    let stale = new_account(&pool, "Stale", "STA-LE0-001").await;
    let done = new_account(&pool, "Done", "DON-E00-001").await;
    new_account(&pool, "Fresh", "FRE-SH0-001").await;

    sqlx::query("UPDATE app_forms SET last_activity_date = NOW() - INTERVAL '3 days' WHERE id = ANY($1)")
        .bind(vec![stale.form.id, done.form.id])
        .execute(&pool)
        .await
        .unwrap();
    AppFormRepo::set_progress(&pool, done.form.id, 100, "completed", true)
        .await
        .unwrap();

    let rows = AppFormRepo::list_inactive(&pool, Utc::now() - Duration::days(2))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].client_name, "Stale");
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_image_keys_counts_and_signatures(pool: PgPool) {
    let account = new_account(&pool, "Images", "IMA-GES-001").await;
    sqlx::query("UPDATE app_forms SET image_source = 'custom' WHERE id = $1")
        .bind(account.form.id)
        .execute(&pool)
        .await
        .unwrap();

    let key = ImageKey::new(AppType::Driver, StoreType::Playstore, ImageType::Logo1024);
    let image = FormImageRepo::create(
        &pool,
        &CreateFormImage {
            form_id: account.form.id,
            key,
            storage_path: format!("form-images/{}/a.png", account.form.id),
            file_url: "http://localhost/files/a.png".to_string(),
            file_name: "a.png".to_string(),
            dimensions: Some("1024x1024".to_string()),
            size_bytes: 10,
        },
    )
    .await
    .unwrap();

    assert_eq!(image.key().unwrap(), key);
    assert_eq!(FormImageRepo::count_for_key(&pool, account.form.id, &key).await.unwrap(), 1);
    assert_eq!(
        FormImageRepo::keys_for_form(&pool, account.form.id).await.unwrap(),
        vec![("driver".to_string(), "playstore".to_string(), "logo_1024".to_string())]
    );

    let sigs = FormImageRepo::custom_source_signatures(&pool).await.unwrap();
    assert_eq!(sigs.len(), 1);
    assert_eq!(sigs[0].image_count, 1);
    assert_eq!(sigs[0].max_image_id, Some(image.id));

    let paths = FormImageRepo::storage_paths_for_client(&pool, account.client.id)
        .await
        .unwrap();
    assert_eq!(paths, vec![image.storage_path.clone()]);

    // Deleting through the wrong form is a no-op.
    assert!(FormImageRepo::delete_for_form(&pool, image.id, account.form.id + 1)
        .await
        .unwrap()
        .is_none());
    assert!(FormImageRepo::delete_for_form(&pool, image.id, account.form.id)
        .await
        .unwrap()
        .is_some());

    let sigs = FormImageRepo::custom_source_signatures(&pool).await.unwrap();
    assert_eq!(sigs[0].image_count, 0);
    assert_eq!(sigs[0].max_image_id, None);
}

// ---------------------------------------------------------------------------
// Notifications and activity
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fan_out_and_read_tracking(pool: PgPool) {
    let account = new_account(&pool, "Fan Out", "FAN-OUT-001").await;
    let a = new_admin(&pool, "a@example.com").await;
    let b = new_admin(&pool, "b@example.com").await;

    let admins = ProfileRepo::admin_ids(&pool).await.unwrap();
    assert_eq!(admins, vec![a, b]);

    let inserted = NotificationRepo::create_for_recipients(
        &pool,
        &admins,
        Some(account.client.id),
        KIND_INACTIVE_WARNING,
        "inactive",
    )
    .await
    .unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(
        NotificationRepo::create_for_recipients(&pool, &[], None, KIND_FORM_UPDATED, "x")
            .await
            .unwrap(),
        0
    );

    let latest = NotificationRepo::latest_for_client(&pool, account.client.id, KIND_INACTIVE_WARNING)
        .await
        .unwrap();
    assert!(latest.is_some());

    let list = NotificationRepo::list_for_recipient(&pool, a, true, 50, 0).await.unwrap();
    assert_eq!(list.len(), 1);
    assert!(NotificationRepo::mark_read(&pool, list[0].id, a).await.unwrap());
    // Another admin cannot mark someone else's notice.
    assert!(!NotificationRepo::mark_read(&pool, list[0].id, b).await.unwrap());
    assert_eq!(NotificationRepo::unread_count(&pool, a).await.unwrap(), 0);
    assert_eq!(NotificationRepo::mark_all_read(&pool, b).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_activity_log_defaults_metadata(pool: PgPool) {
    let admin = new_admin(&pool, "logger@example.com").await;
    let entry = ActivityLogRepo::create(
        &pool,
        &CreateActivityLog {
            admin_profile_id: admin,
            action_type: "client_created".to_string(),
            action_description: "Created client Acme".to_string(),
            target_type: Some("client".to_string()),
            target_id: Some(42),
            target_name: Some("Acme".to_string()),
            metadata: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(entry.metadata, serde_json::json!({}));

    let rows = ActivityLogRepo::list_for_target(&pool, "client", 42).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(ActivityLogRepo::list(&pool, 10, 0).await.unwrap().len(), 1);
}
