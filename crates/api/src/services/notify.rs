//! Notification fan-out.
//!
//! Administrator notices are written for every admin profile in a single
//! statement, so either all recipients get the row or none do.

use intake_core::notification::NotificationKind;
use intake_core::types::DbId;
use intake_db::models::client::Client;
use intake_db::models::notification::CreateNotification;
use intake_db::repositories::{NotificationRepo, ProfileRepo};
use sqlx::PgPool;

use crate::error::AppResult;

/// Notify every administrator about a client. Returns the number of rows written.
pub async fn notify_admins(
    pool: &PgPool,
    client_id: DbId,
    kind: NotificationKind,
    message: &str,
) -> AppResult<u64> {
    let admins = ProfileRepo::admin_ids(pool).await?;
    if admins.is_empty() {
        tracing::warn!(client_id, kind = kind.as_str(), "No administrators to notify");
        return Ok(0);
    }

    let written = NotificationRepo::create_for_recipients(
        pool,
        &admins,
        Some(client_id),
        kind.as_str(),
        message,
    )
    .await?;

    tracing::info!(
        client_id,
        kind = kind.as_str(),
        recipients = written,
        "Notified administrators"
    );
    Ok(written)
}

/// Notify the client's own profile.
pub async fn notify_client(
    pool: &PgPool,
    client: &Client,
    kind: NotificationKind,
    message: String,
) -> AppResult<()> {
    let input = CreateNotification {
        recipient_profile_id: client.profile_id,
        client_id: Some(client.id),
        kind: kind.as_str().to_string(),
        message,
    };
    NotificationRepo::create(pool, &input).await?;

    tracing::info!(client_id = client.id, kind = kind.as_str(), "Notified client");
    Ok(())
}
