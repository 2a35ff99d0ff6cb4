//! Interval poll that keeps `images_uploaded` and progress in step with the
//! uploads of custom-source forms.
//!
//! Each pass reads a cheap per-form signature (image count and newest image
//! id) and only recomputes forms whose signature moved since the last pass.

use std::collections::HashSet;
use std::time::Duration;

use intake_core::clock::ChangeDetector;
use intake_core::types::DbId;
use intake_db::repositories::{AppFormRepo, FormImageRepo};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::error::AppResult;
use crate::services::workflow::recompute;

/// Poller state: the last signature seen per form.
#[derive(Debug, Default)]
pub struct ImageSync {
    detector: ChangeDetector<DbId, (i64, Option<DbId>)>,
}

impl ImageSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forms currently tracked.
    pub fn tracked(&self) -> usize {
        self.detector.len()
    }

    /// Run one pass. Returns the number of forms whose stored progress changed.
    pub async fn poll_once(&mut self, pool: &PgPool) -> AppResult<usize> {
        let signatures = FormImageRepo::custom_source_signatures(pool).await?;

        let live: HashSet<DbId> = signatures.iter().map(|s| s.form_id).collect();
        self.detector.retain(|id| live.contains(id));

        let mut updated = 0;
        for signature in signatures {
            let value = (signature.image_count, signature.max_image_id);
            if !self.detector.observe(signature.form_id, value) {
                continue;
            }
            let Some(form) = AppFormRepo::find_by_id(pool, signature.form_id).await? else {
                self.detector.forget(&signature.form_id);
                continue;
            };
            let changed = match recompute(pool, form).await {
                Ok((_, changed)) => changed,
                Err(e) => {
                    // Seen but not applied; retry on the next pass.
                    self.detector.forget(&signature.form_id);
                    return Err(e);
                }
            };
            if changed {
                updated += 1;
            }
        }

        if updated > 0 {
            tracing::info!(updated, "Image sync updated forms");
        }
        Ok(updated)
    }

    /// Run the poll loop until `cancel` is triggered.
    pub async fn run(mut self, pool: PgPool, interval: Duration, cancel: CancellationToken) {
        tracing::info!(interval_secs = interval.as_secs(), "Image sync job started");

        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Image sync job stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once(&pool).await {
                        tracing::error!(error = %e, "Image sync pass failed");
                    }
                }
            }
        }
    }
}
