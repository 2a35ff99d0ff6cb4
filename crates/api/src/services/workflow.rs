//! Form workflow: progress recompute, milestone notices, the review cycle and
//! client corrections.
//!
//! Every path that changes what the calculator reads ends in [`recompute`],
//! so the stored percentage is always derived from current field values and
//! uploads. Client-side changes additionally fire the milestone and
//! post-review notices.

use intake_core::error::CoreError;
use intake_core::form::{ImageSource, StoreOwner};
use intake_core::image_catalog::ImageKey;
use intake_core::notification::{
    corrections_completed_message, form_completed_message, post_review_edit_message,
    quarter_reached_message, review_approved_message, review_rejected_message,
    NotificationKind,
};
use intake_core::progress::{
    compute_progress, detect_crossing, ProgressCrossing, ProgressInput, ProgressReport,
};
use intake_core::review;
use intake_core::types::DbId;
use intake_db::models::app_form::{AppForm, ReviewUpdate, UpdateFormFields};
use intake_db::models::client::Client;
use intake_db::repositories::{AppFormRepo, ClientRepo, FormImageRepo};
use serde::Deserialize;
use sqlx::PgPool;
use validator::{Validate, ValidateEmail};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::services::activity::{
    self, Activity, ACTION_FORM_APPROVED, ACTION_FORM_REJECTED, TARGET_FORM,
};
use crate::services::notify::{notify_admins, notify_client};
use crate::state::AppState;

fn form_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "AppForm",
        id,
    })
}

/// Load a form or fail with 404.
pub async fn find_form(pool: &PgPool, id: DbId) -> AppResult<AppForm> {
    AppFormRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| form_not_found(id))
}

/* --------------------------------------------------------------------------
Progress
-------------------------------------------------------------------------- */

/// Catalog keys of every image stored for a form.
pub async fn uploaded_keys(pool: &PgPool, form_id: DbId) -> AppResult<Vec<ImageKey>> {
    FormImageRepo::keys_for_form(pool, form_id)
        .await?
        .iter()
        .map(|(app, store, kind)| ImageKey::parse(app, store, kind).map_err(AppError::from))
        .collect()
}

/// Run the calculator over a stored form.
pub fn progress_of(form: &AppForm, uploaded: &[ImageKey]) -> AppResult<ProgressReport> {
    let input = ProgressInput {
        text_values: form.weighted_text_values(),
        image_source: form.image_source()?,
        uploaded,
    };
    Ok(compute_progress(&input))
}

/// Recompute a form's progress and persist it when anything moved.
///
/// Returns the current row and whether it was written.
pub async fn recompute(pool: &PgPool, form: AppForm) -> AppResult<(AppForm, bool)> {
    let uploaded = uploaded_keys(pool, form.id).await?;
    let report = progress_of(&form, &uploaded)?;

    let unchanged = report.percentage == form.progress_percentage
        && report.status.as_str() == form.status
        && report.images_uploaded == form.images_uploaded;
    if unchanged {
        return Ok((form, false));
    }

    let updated = AppFormRepo::set_progress(
        pool,
        form.id,
        report.percentage,
        report.status.as_str(),
        report.images_uploaded,
    )
    .await?
    .ok_or_else(|| form_not_found(form.id))?;

    tracing::debug!(
        form_id = form.id,
        from = form.progress_percentage,
        to = updated.progress_percentage,
        images_uploaded = updated.images_uploaded,
        "Progress recomputed"
    );
    Ok((updated, true))
}

/// Recompute every form. Returns how many rows changed.
pub async fn recalculate_all(pool: &PgPool) -> AppResult<usize> {
    let forms = AppFormRepo::list(pool).await?;
    let total = forms.len();
    let mut updated = 0;
    for form in forms {
        let (_, changed) = recompute(pool, form).await?;
        if changed {
            updated += 1;
        }
    }
    tracing::info!(total, updated, "Recalculated all forms");
    Ok(updated)
}

/// Send the milestone notice for a client-side recompute, if one was crossed.
///
/// Returns the form as stored afterwards.
async fn fire_crossing(
    pool: &PgPool,
    client: &Client,
    previous: i32,
    form: AppForm,
) -> AppResult<AppForm> {
    let Some(crossing) = detect_crossing(
        previous,
        form.progress_percentage,
        form.quarter_milestone_notified,
    ) else {
        return Ok(form);
    };

    // Any crossing consumes the quarter notice, so a later dip and climb
    // does not announce it again.
    let (form, claimed) = match AppFormRepo::claim_quarter_milestone(pool, form.id).await? {
        Some(updated) => (updated, true),
        None => (form, false),
    };

    match crossing {
        ProgressCrossing::Completed => {
            notify_admins(
                pool,
                client.id,
                NotificationKind::FormCompleted,
                &form_completed_message(&client.name),
            )
            .await?;
        }
        ProgressCrossing::QuarterReached if claimed => {
            notify_admins(
                pool,
                client.id,
                NotificationKind::FormUpdated,
                &quarter_reached_message(&client.name, form.progress_percentage),
            )
            .await?;
        }
        ProgressCrossing::QuarterReached => {}
    }
    Ok(form)
}

/// Recompute after a client mutation and fire milestone notices.
pub async fn after_client_change(
    pool: &PgPool,
    client: &Client,
    previous: i32,
    form: AppForm,
) -> AppResult<AppForm> {
    let (form, _) = recompute(pool, form).await?;
    fire_crossing(pool, client, previous, form).await
}

/* --------------------------------------------------------------------------
Client edits
-------------------------------------------------------------------------- */

/// Reject a patch before anything is written.
pub fn validate_patch(patch: &UpdateFormFields) -> AppResult<()> {
    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    patch.validate()?;

    for (field, value) in patch.email_fields() {
        if !value.validate_email() {
            return Err(CoreError::Validation(format!(
                "{field} must be a valid email address"
            ))
            .into());
        }
    }
    if let Some(source) = patch.image_source.as_deref() {
        ImageSource::from_str_value(source)?;
    }
    for owner in [patch.play_store_owner.as_deref(), patch.app_store_owner.as_deref()]
        .into_iter()
        .flatten()
    {
        StoreOwner::from_str_value(owner)?;
    }
    Ok(())
}

/// Apply a client's edit: write the fields, recompute, and send whatever
/// notices the edit triggers.
pub async fn apply_client_edit(
    state: &AppState,
    client: &Client,
    form: AppForm,
    patch: &UpdateFormFields,
) -> AppResult<AppForm> {
    validate_patch(patch)?;
    let pool = &state.pool;
    let previous = form.progress_percentage;

    let edited = AppFormRepo::update_fields(pool, form.id, patch, state.clock.now())
        .await?
        .ok_or_else(|| form_not_found(form.id))?;
    let form = after_client_change(pool, client, previous, edited).await?;

    tracing::info!(
        client_id = client.id,
        form_id = form.id,
        progress = form.progress_percentage,
        "Client updated form"
    );

    if post_review_notice(pool, client, &form).await? {
        return find_form(pool, form.id).await;
    }
    Ok(form)
}

/// Handle an edit to a form that was already reviewed.
///
/// The first edit after a review notifies administrators once. Any edit
/// after a review withdraws a previous corrections acknowledgment. Returns
/// whether the row was modified.
async fn post_review_notice(pool: &PgPool, client: &Client, form: &AppForm) -> AppResult<bool> {
    let review_status = form.review_status()?;
    if !review_status.is_reviewed() {
        return Ok(false);
    }

    if review::needs_post_review_notice(review_status, form.admin_notified_of_changes)
        && AppFormRepo::claim_change_notice(pool, form.id).await?.is_some()
    {
        notify_admins(
            pool,
            client.id,
            NotificationKind::FormUpdated,
            &post_review_edit_message(&client.name),
        )
        .await?;
        return Ok(true);
    }

    Ok(AppFormRepo::clear_corrections_completed(pool, form.id).await?)
}

/// Acknowledge the corrections requested by a rejection.
pub async fn complete_corrections(
    state: &AppState,
    client: &Client,
    form: AppForm,
) -> AppResult<AppForm> {
    review::can_mark_corrections_complete(form.review_status()?)?;
    if form.corrections_completed {
        return Ok(form);
    }

    let form = AppFormRepo::mark_corrections_complete(&state.pool, form.id, state.clock.now())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "The form was reviewed again before the corrections were acknowledged".into(),
            ))
        })?;

    notify_admins(
        &state.pool,
        client.id,
        NotificationKind::CorrectionsCompleted,
        &corrections_completed_message(&client.name),
    )
    .await?;

    tracing::info!(client_id = client.id, form_id = form.id, "Corrections completed");
    Ok(form)
}

/* --------------------------------------------------------------------------
Review
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Body of the approve and reject endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub feedback: Option<String>,
}

/// Record an administrator's decision and notify the client.
pub async fn review_form(
    state: &AppState,
    admin: &AuthUser,
    form_id: DbId,
    decision: ReviewDecision,
    feedback: Option<&str>,
) -> AppResult<AppForm> {
    let pool = &state.pool;
    let form = find_form(pool, form_id).await?;

    let outcome = match decision {
        ReviewDecision::Approve => review::approve(form.progress_percentage, feedback),
        ReviewDecision::Reject => review::reject(form.progress_percentage, feedback)?,
    };

    let update = ReviewUpdate {
        review_status: outcome.review_status.as_str().to_string(),
        review_feedback: outcome.review_feedback,
        progress_percentage: outcome.progress_percentage,
        status: outcome.status.as_str().to_string(),
        reviewed_by: admin.profile_id,
    };
    let reviewed = AppFormRepo::apply_review(pool, form_id, &update)
        .await?
        .ok_or_else(|| form_not_found(form_id))?;

    let client = ClientRepo::find_by_id(pool, reviewed.client_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Client",
                id: reviewed.client_id,
            })
        })?;

    let (kind, message, action_type) = match decision {
        ReviewDecision::Approve => (
            NotificationKind::FormCompleted,
            review_approved_message(),
            ACTION_FORM_APPROVED,
        ),
        ReviewDecision::Reject => (
            NotificationKind::FormUpdated,
            review_rejected_message(),
            ACTION_FORM_REJECTED,
        ),
    };
    notify_client(pool, &client, kind, message).await?;

    activity::record(
        pool,
        admin,
        Activity {
            action_type,
            description: format!("Reviewed the form of {}", client.name),
            target: Some((TARGET_FORM, reviewed.id, &client.name)),
            metadata: Some(serde_json::json!({
                "review_status": reviewed.review_status,
                "previous_progress": form.progress_percentage,
                "progress": reviewed.progress_percentage,
            })),
        },
    )
    .await;

    tracing::info!(
        form_id,
        admin_profile_id = admin.profile_id,
        review_status = %reviewed.review_status,
        "Form reviewed"
    );
    Ok(reviewed)
}
