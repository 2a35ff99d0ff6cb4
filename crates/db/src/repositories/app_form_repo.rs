//! Repository for the `app_forms` table.
//!
//! Review and notice flags are flipped with conditional `UPDATE ... WHERE`
//! statements so that concurrent requests cannot both claim the same
//! one-shot transition.

use intake_core::form::{REVIEW_APPROVED, REVIEW_REJECTED};
use intake_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::app_form::{AppForm, InactiveForm, ReviewUpdate, UpdateFormFields, UpdateMeeting};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, client_id, \
    driver_app_name, passenger_app_name, support_email, \
    playstore_driver_short_description, playstore_driver_long_description, \
    playstore_passenger_short_description, playstore_passenger_long_description, \
    appstore_driver_description, appstore_passenger_description, \
    driver_terms, passenger_terms, \
    company_terms, play_store_owner, app_store_owner, \
    playstore_owner_name, playstore_owner_email, appstore_owner_name, appstore_owner_email, \
    image_source, images_uploaded, \
    progress_percentage, status, quarter_milestone_notified, \
    review_status, review_feedback, reviewed_at, reviewed_by, \
    corrections_completed, corrections_completed_at, admin_notified_of_changes, \
    project_status, completion_date, meeting_scheduled, meeting_date, meeting_time, \
    last_activity_date, last_client_update, created_at, updated_at";

/// Provides CRUD operations for submission forms.
pub struct AppFormRepo;

impl AppFormRepo {
    /// Find a form by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AppForm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM app_forms WHERE id = $1");
        sqlx::query_as::<_, AppForm>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the form owned by a client.
    pub async fn find_by_client_id(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Option<AppForm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM app_forms WHERE client_id = $1");
        sqlx::query_as::<_, AppForm>(&query)
            .bind(client_id)
            .fetch_optional(pool)
            .await
    }

    /// List every form, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<AppForm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM app_forms ORDER BY id");
        sqlx::query_as::<_, AppForm>(&query).fetch_all(pool).await
    }

    /// Apply a client's field edits. Only non-`None` fields are written.
    ///
    /// Stamps `last_activity_date` and `last_client_update` with `now`.
    pub async fn update_fields(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFormFields,
        now: Timestamp,
    ) -> Result<Option<AppForm>, sqlx::Error> {
        let query = format!(
            "UPDATE app_forms SET
                driver_app_name = COALESCE($2, driver_app_name),
                passenger_app_name = COALESCE($3, passenger_app_name),
                support_email = COALESCE($4, support_email),
                playstore_driver_short_description = COALESCE($5, playstore_driver_short_description),
                playstore_driver_long_description = COALESCE($6, playstore_driver_long_description),
                playstore_passenger_short_description = COALESCE($7, playstore_passenger_short_description),
                playstore_passenger_long_description = COALESCE($8, playstore_passenger_long_description),
                appstore_driver_description = COALESCE($9, appstore_driver_description),
                appstore_passenger_description = COALESCE($10, appstore_passenger_description),
                driver_terms = COALESCE($11, driver_terms),
                passenger_terms = COALESCE($12, passenger_terms),
                company_terms = COALESCE($13, company_terms),
                play_store_owner = COALESCE($14, play_store_owner),
                app_store_owner = COALESCE($15, app_store_owner),
                playstore_owner_name = COALESCE($16, playstore_owner_name),
                playstore_owner_email = COALESCE($17, playstore_owner_email),
                appstore_owner_name = COALESCE($18, appstore_owner_name),
                appstore_owner_email = COALESCE($19, appstore_owner_email),
                image_source = COALESCE($20, image_source),
                last_activity_date = $21,
                last_client_update = $21
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppForm>(&query)
            .bind(id)
            .bind(&input.driver_app_name)
            .bind(&input.passenger_app_name)
            .bind(&input.support_email)
            .bind(&input.playstore_driver_short_description)
            .bind(&input.playstore_driver_long_description)
            .bind(&input.playstore_passenger_short_description)
            .bind(&input.playstore_passenger_long_description)
            .bind(&input.appstore_driver_description)
            .bind(&input.appstore_passenger_description)
            .bind(&input.driver_terms)
            .bind(&input.passenger_terms)
            .bind(&input.company_terms)
            .bind(&input.play_store_owner)
            .bind(&input.app_store_owner)
            .bind(&input.playstore_owner_name)
            .bind(&input.playstore_owner_email)
            .bind(&input.appstore_owner_name)
            .bind(&input.appstore_owner_email)
            .bind(&input.image_source)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Stamp client activity without changing any field.
    pub async fn touch_activity(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<AppForm>, sqlx::Error> {
        let query = format!(
            "UPDATE app_forms SET last_activity_date = $2, last_client_update = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppForm>(&query)
            .bind(id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Persist a recomputed percentage, status and image cache.
    pub async fn set_progress(
        pool: &PgPool,
        id: DbId,
        progress_percentage: i32,
        status: &str,
        images_uploaded: bool,
    ) -> Result<Option<AppForm>, sqlx::Error> {
        let query = format!(
            "UPDATE app_forms SET
                progress_percentage = $2,
                status = $3,
                images_uploaded = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppForm>(&query)
            .bind(id)
            .bind(progress_percentage)
            .bind(status)
            .bind(images_uploaded)
            .fetch_optional(pool)
            .await
    }

    /// Record a review decision.
    ///
    /// Always clears the correction acknowledgment and the change-notice
    /// flag so the next client edit notifies administrators again.
    pub async fn apply_review(
        pool: &PgPool,
        id: DbId,
        review: &ReviewUpdate,
    ) -> Result<Option<AppForm>, sqlx::Error> {
        let query = format!(
            "UPDATE app_forms SET
                review_status = $2,
                review_feedback = $3,
                progress_percentage = $4,
                status = $5,
                reviewed_by = $6,
                reviewed_at = NOW(),
                corrections_completed = false,
                corrections_completed_at = NULL,
                admin_notified_of_changes = false
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppForm>(&query)
            .bind(id)
            .bind(&review.review_status)
            .bind(&review.review_feedback)
            .bind(review.progress_percentage)
            .bind(&review.status)
            .bind(review.reviewed_by)
            .fetch_optional(pool)
            .await
    }

    /// Claim the one-shot post-review change notice.
    ///
    /// Returns the updated form only for the caller that flipped
    /// `admin_notified_of_changes` from false to true on a reviewed form.
    pub async fn claim_change_notice(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AppForm>, sqlx::Error> {
        let query = format!(
            "UPDATE app_forms SET
                admin_notified_of_changes = true,
                corrections_completed = false,
                corrections_completed_at = NULL
             WHERE id = $1
               AND review_status IN ($2, $3)
               AND admin_notified_of_changes = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppForm>(&query)
            .bind(id)
            .bind(REVIEW_APPROVED)
            .bind(REVIEW_REJECTED)
            .fetch_optional(pool)
            .await
    }

    /// Reset the correction acknowledgment after a post-review edit whose
    /// notice was already sent.
    pub async fn clear_corrections_completed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE app_forms SET corrections_completed = false, corrections_completed_at = NULL
             WHERE id = $1 AND corrections_completed = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Acknowledge corrections on a rejected form.
    ///
    /// Returns `None` if the form is not currently rejected.
    pub async fn mark_corrections_complete(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<AppForm>, sqlx::Error> {
        let query = format!(
            "UPDATE app_forms SET
                corrections_completed = true,
                corrections_completed_at = $2,
                last_activity_date = $2
             WHERE id = $1 AND review_status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppForm>(&query)
            .bind(id)
            .bind(now)
            .bind(REVIEW_REJECTED)
            .fetch_optional(pool)
            .await
    }

    /// Record that the quarter milestone notice went out.
    ///
    /// Returns the updated row only for the caller that flipped the flag.
    pub async fn claim_quarter_milestone(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AppForm>, sqlx::Error> {
        let query = format!(
            "UPDATE app_forms SET quarter_milestone_notified = true
             WHERE id = $1 AND quarter_milestone_notified = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppForm>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update meeting fields. Only non-`None` fields are written.
    pub async fn update_meeting(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMeeting,
    ) -> Result<Option<AppForm>, sqlx::Error> {
        let query = format!(
            "UPDATE app_forms SET
                meeting_scheduled = COALESCE($2, meeting_scheduled),
                meeting_date = COALESCE($3, meeting_date),
                meeting_time = COALESCE($4, meeting_time)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppForm>(&query)
            .bind(id)
            .bind(input.meeting_scheduled)
            .bind(input.meeting_date)
            .bind(input.meeting_time)
            .fetch_optional(pool)
            .await
    }

    /// Move the project pipeline. Reaching `completed` stamps
    /// `completion_date` once; leaving it clears the stamp.
    pub async fn update_project_status(
        pool: &PgPool,
        id: DbId,
        project_status: &str,
    ) -> Result<Option<AppForm>, sqlx::Error> {
        let query = format!(
            "UPDATE app_forms SET
                project_status = $2,
                completion_date = CASE
                    WHEN $2 = 'completed' THEN COALESCE(completion_date, NOW())
                    ELSE NULL
                END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppForm>(&query)
            .bind(id)
            .bind(project_status)
            .fetch_optional(pool)
            .await
    }

    /// Incomplete forms whose last activity is older than `cutoff`.
    pub async fn list_inactive(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<InactiveForm>, sqlx::Error> {
        sqlx::query_as::<_, InactiveForm>(
            "SELECT f.id AS form_id, f.client_id, c.name AS client_name,
                    f.progress_percentage, f.last_activity_date
             FROM app_forms f
             JOIN clients c ON c.id = f.client_id
             WHERE f.last_activity_date < $1
               AND f.progress_percentage < 100
             ORDER BY f.last_activity_date",
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await
    }
}
