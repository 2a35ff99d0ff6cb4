//! Submission form model and DTOs.

use chrono::{NaiveDate, NaiveTime};
use intake_core::error::CoreError;
use intake_core::form::{
    ImageSource, ProjectStatus, ReviewStatus, APPSTORE_DESCRIPTION_MAX,
    PLAYSTORE_LONG_DESCRIPTION_MAX, PLAYSTORE_SHORT_DESCRIPTION_MAX, WEIGHTED_FIELD_COUNT,
};
use intake_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `app_forms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppForm {
    pub id: DbId,
    pub client_id: DbId,

    pub driver_app_name: Option<String>,
    pub passenger_app_name: Option<String>,
    pub support_email: Option<String>,
    pub playstore_driver_short_description: Option<String>,
    pub playstore_driver_long_description: Option<String>,
    pub playstore_passenger_short_description: Option<String>,
    pub playstore_passenger_long_description: Option<String>,
    pub appstore_driver_description: Option<String>,
    pub appstore_passenger_description: Option<String>,
    pub driver_terms: Option<String>,
    pub passenger_terms: Option<String>,

    pub company_terms: Option<String>,
    pub play_store_owner: Option<String>,
    pub app_store_owner: Option<String>,
    pub playstore_owner_name: Option<String>,
    pub playstore_owner_email: Option<String>,
    pub appstore_owner_name: Option<String>,
    pub appstore_owner_email: Option<String>,

    pub image_source: Option<String>,
    pub images_uploaded: bool,

    pub progress_percentage: i32,
    pub status: String,
    pub quarter_milestone_notified: bool,

    pub review_status: String,
    pub review_feedback: Option<String>,
    pub reviewed_at: Option<Timestamp>,
    pub reviewed_by: Option<DbId>,
    pub corrections_completed: bool,
    pub corrections_completed_at: Option<Timestamp>,
    pub admin_notified_of_changes: bool,

    pub project_status: String,
    pub completion_date: Option<Timestamp>,
    pub meeting_scheduled: bool,
    pub meeting_date: Option<NaiveDate>,
    pub meeting_time: Option<NaiveTime>,

    pub last_activity_date: Option<Timestamp>,
    pub last_client_update: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AppForm {
    /// Weighted text values in the fixed catalog order.
    pub fn weighted_text_values(&self) -> [Option<&str>; WEIGHTED_FIELD_COUNT] {
        [
            self.driver_app_name.as_deref(),
            self.passenger_app_name.as_deref(),
            self.support_email.as_deref(),
            self.playstore_driver_short_description.as_deref(),
            self.playstore_driver_long_description.as_deref(),
            self.playstore_passenger_short_description.as_deref(),
            self.playstore_passenger_long_description.as_deref(),
            self.appstore_driver_description.as_deref(),
            self.appstore_passenger_description.as_deref(),
            self.driver_terms.as_deref(),
            self.passenger_terms.as_deref(),
        ]
    }

    pub fn image_source(&self) -> Result<Option<ImageSource>, CoreError> {
        self.image_source
            .as_deref()
            .map(ImageSource::from_str_value)
            .transpose()
    }

    pub fn review_status(&self) -> Result<ReviewStatus, CoreError> {
        ReviewStatus::from_str_value(&self.review_status)
    }

    pub fn project_status(&self) -> Result<ProjectStatus, CoreError> {
        ProjectStatus::from_str_value(&self.project_status)
    }
}

/// DTO for a client editing their form. All fields are optional.
///
/// Sending an empty string clears a text field for progress purposes. Email
/// fields are checked by the caller, since a blank value is allowed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFormFields {
    #[validate(length(max = 30))]
    pub driver_app_name: Option<String>,
    #[validate(length(max = 30))]
    pub passenger_app_name: Option<String>,
    pub support_email: Option<String>,
    #[validate(length(max = PLAYSTORE_SHORT_DESCRIPTION_MAX))]
    pub playstore_driver_short_description: Option<String>,
    #[validate(length(max = PLAYSTORE_LONG_DESCRIPTION_MAX))]
    pub playstore_driver_long_description: Option<String>,
    #[validate(length(max = PLAYSTORE_SHORT_DESCRIPTION_MAX))]
    pub playstore_passenger_short_description: Option<String>,
    #[validate(length(max = PLAYSTORE_LONG_DESCRIPTION_MAX))]
    pub playstore_passenger_long_description: Option<String>,
    #[validate(length(max = APPSTORE_DESCRIPTION_MAX))]
    pub appstore_driver_description: Option<String>,
    #[validate(length(max = APPSTORE_DESCRIPTION_MAX))]
    pub appstore_passenger_description: Option<String>,
    pub driver_terms: Option<String>,
    pub passenger_terms: Option<String>,

    pub company_terms: Option<String>,
    pub play_store_owner: Option<String>,
    pub app_store_owner: Option<String>,
    pub playstore_owner_name: Option<String>,
    pub playstore_owner_email: Option<String>,
    pub appstore_owner_name: Option<String>,
    pub appstore_owner_email: Option<String>,

    pub image_source: Option<String>,
}

impl UpdateFormFields {
    /// Whether the patch touches anything at all.
    pub fn is_empty(&self) -> bool {
        self.driver_app_name.is_none()
            && self.passenger_app_name.is_none()
            && self.support_email.is_none()
            && self.playstore_driver_short_description.is_none()
            && self.playstore_driver_long_description.is_none()
            && self.playstore_passenger_short_description.is_none()
            && self.playstore_passenger_long_description.is_none()
            && self.appstore_driver_description.is_none()
            && self.appstore_passenger_description.is_none()
            && self.driver_terms.is_none()
            && self.passenger_terms.is_none()
            && self.company_terms.is_none()
            && self.play_store_owner.is_none()
            && self.app_store_owner.is_none()
            && self.playstore_owner_name.is_none()
            && self.playstore_owner_email.is_none()
            && self.appstore_owner_name.is_none()
            && self.appstore_owner_email.is_none()
            && self.image_source.is_none()
    }

    /// Non-blank email values, labelled by field, for shape checking.
    pub fn email_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("support_email", self.support_email.as_deref()),
            ("playstore_owner_email", self.playstore_owner_email.as_deref()),
            ("appstore_owner_email", self.appstore_owner_email.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (field, v))
        })
        .collect()
    }
}

/// DTO for an administrator scheduling the kickoff meeting.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMeeting {
    pub meeting_scheduled: Option<bool>,
    pub meeting_date: Option<NaiveDate>,
    pub meeting_time: Option<NaiveTime>,
}

/// DTO for an administrator moving the project pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProjectStatus {
    pub project_status: String,
}

/// Column values written by a review decision.
#[derive(Debug, Clone)]
pub struct ReviewUpdate {
    pub review_status: String,
    pub review_feedback: Option<String>,
    pub progress_percentage: i32,
    pub status: String,
    pub reviewed_by: DbId,
}

/// Inactive form joined with its client, as read by the inactivity scan.
#[derive(Debug, Clone, FromRow)]
pub struct InactiveForm {
    pub form_id: DbId,
    pub client_id: DbId,
    pub client_name: String,
    pub progress_percentage: i32,
    pub last_activity_date: Option<Timestamp>,
}
