//! Periodic inactivity warnings.
//!
//! Incomplete forms that have not been touched for the inactivity window
//! raise one `inactive_warning` per client per window, addressed to every
//! administrator.

use std::sync::Arc;
use std::time::Duration;

use intake_core::clock::Clock;
use intake_core::inactivity::{inactivity_cutoff, is_inactive, warned_within_window};
use intake_core::notification::{inactive_warning_message, NotificationKind, KIND_INACTIVE_WARNING};
use intake_db::repositories::{AppFormRepo, NotificationRepo};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::error::AppResult;
use crate::services::notify::notify_admins;

/// Run one scan. Returns the number of clients warned about.
pub async fn scan_once(pool: &PgPool, clock: &dyn Clock) -> AppResult<usize> {
    let now = clock.now();
    let candidates = AppFormRepo::list_inactive(pool, inactivity_cutoff(now)).await?;

    let mut warned = 0;
    for form in &candidates {
        if !is_inactive(form.last_activity_date, form.progress_percentage, now) {
            continue;
        }
        let last_warning =
            NotificationRepo::latest_for_client(pool, form.client_id, KIND_INACTIVE_WARNING)
                .await?;
        if warned_within_window(last_warning, now) {
            tracing::debug!(client_id = form.client_id, "Inactivity already reported this window");
            continue;
        }

        notify_admins(
            pool,
            form.client_id,
            NotificationKind::InactiveWarning,
            &inactive_warning_message(&form.client_name, form.progress_percentage),
        )
        .await?;
        warned += 1;
    }

    tracing::info!(candidates = candidates.len(), warned, "Inactivity scan finished");
    Ok(warned)
}

/// Run the scan loop until `cancel` is triggered.
pub async fn run(
    pool: PgPool,
    clock: Arc<dyn Clock>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Inactivity scan job started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Inactivity scan job stopping");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = scan_once(&pool, clock.as_ref()).await {
                    tracing::error!(error = %e, "Inactivity scan failed");
                }
            }
        }
    }
}
