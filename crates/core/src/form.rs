//! Submission form field catalog and status enums.
//!
//! A client owns exactly one form. Eleven text fields carry progress weight;
//! the remaining columns (store owners, company terms, meeting data) are
//! collected but never counted.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Weighted text fields
-------------------------------------------------------------------------- */

pub const FIELD_DRIVER_APP_NAME: &str = "driver_app_name";
pub const FIELD_PASSENGER_APP_NAME: &str = "passenger_app_name";
pub const FIELD_SUPPORT_EMAIL: &str = "support_email";
pub const FIELD_PLAYSTORE_DRIVER_SHORT: &str = "playstore_driver_short_description";
pub const FIELD_PLAYSTORE_DRIVER_LONG: &str = "playstore_driver_long_description";
pub const FIELD_PLAYSTORE_PASSENGER_SHORT: &str = "playstore_passenger_short_description";
pub const FIELD_PLAYSTORE_PASSENGER_LONG: &str = "playstore_passenger_long_description";
pub const FIELD_APPSTORE_DRIVER_DESCRIPTION: &str = "appstore_driver_description";
pub const FIELD_APPSTORE_PASSENGER_DESCRIPTION: &str = "appstore_passenger_description";
pub const FIELD_DRIVER_TERMS: &str = "driver_terms";
pub const FIELD_PASSENGER_TERMS: &str = "passenger_terms";

/// Number of text fields that carry progress weight.
pub const WEIGHTED_FIELD_COUNT: usize = 11;

/// The fixed, ordered list of weighted text fields.
///
/// Form models expose their values in this exact order.
pub const WEIGHTED_TEXT_FIELDS: [&str; WEIGHTED_FIELD_COUNT] = [
    FIELD_DRIVER_APP_NAME,
    FIELD_PASSENGER_APP_NAME,
    FIELD_SUPPORT_EMAIL,
    FIELD_PLAYSTORE_DRIVER_SHORT,
    FIELD_PLAYSTORE_DRIVER_LONG,
    FIELD_PLAYSTORE_PASSENGER_SHORT,
    FIELD_PLAYSTORE_PASSENGER_LONG,
    FIELD_APPSTORE_DRIVER_DESCRIPTION,
    FIELD_APPSTORE_PASSENGER_DESCRIPTION,
    FIELD_DRIVER_TERMS,
    FIELD_PASSENGER_TERMS,
];

/// Play Store short description limit (characters).
pub const PLAYSTORE_SHORT_DESCRIPTION_MAX: u64 = 80;

/// Play Store long description limit (characters).
pub const PLAYSTORE_LONG_DESCRIPTION_MAX: u64 = 4000;

/// App Store description limit (characters).
pub const APPSTORE_DESCRIPTION_MAX: u64 = 4000;

/// A field value counts as filled when it is non-empty after trimming.
pub fn is_filled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/* --------------------------------------------------------------------------
Form status
-------------------------------------------------------------------------- */

pub const STATUS_NOT_STARTED: &str = "not_started";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";

/// All valid form status strings.
pub const VALID_FORM_STATUSES: &[&str] = &[STATUS_NOT_STARTED, STATUS_IN_PROGRESS, STATUS_COMPLETED];

/// Completion state derived from the progress percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl FormStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_NOT_STARTED => Ok(Self::NotStarted),
            STATUS_IN_PROGRESS => Ok(Self::InProgress),
            STATUS_COMPLETED => Ok(Self::Completed),
            _ => Err(CoreError::Validation(format!(
                "Invalid form status '{s}'. Must be one of: {}",
                VALID_FORM_STATUSES.join(", ")
            ))),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => STATUS_NOT_STARTED,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::Completed => STATUS_COMPLETED,
        }
    }
}

/* --------------------------------------------------------------------------
Image source
-------------------------------------------------------------------------- */

pub const IMAGE_SOURCE_TILARY: &str = "tilary";
pub const IMAGE_SOURCE_CUSTOM: &str = "custom";

/// All valid image source strings.
pub const VALID_IMAGE_SOURCES: &[&str] = &[IMAGE_SOURCE_TILARY, IMAGE_SOURCE_CUSTOM];

/// Where the store imagery comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// The default asset pack supplied by the studio.
    Tilary,
    /// Client-uploaded images, checked against the required catalog.
    Custom,
}

impl ImageSource {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            IMAGE_SOURCE_TILARY => Ok(Self::Tilary),
            IMAGE_SOURCE_CUSTOM => Ok(Self::Custom),
            _ => Err(CoreError::Validation(format!(
                "Invalid image source '{s}'. Must be one of: {}",
                VALID_IMAGE_SOURCES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tilary => IMAGE_SOURCE_TILARY,
            Self::Custom => IMAGE_SOURCE_CUSTOM,
        }
    }
}

/* --------------------------------------------------------------------------
Review status
-------------------------------------------------------------------------- */

pub const REVIEW_PENDING: &str = "pending";
pub const REVIEW_APPROVED: &str = "approved";
pub const REVIEW_REJECTED: &str = "rejected";

/// All valid review status strings.
pub const VALID_REVIEW_STATUSES: &[&str] = &[REVIEW_PENDING, REVIEW_APPROVED, REVIEW_REJECTED];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            REVIEW_PENDING => Ok(Self::Pending),
            REVIEW_APPROVED => Ok(Self::Approved),
            REVIEW_REJECTED => Ok(Self::Rejected),
            _ => Err(CoreError::Validation(format!(
                "Invalid review status '{s}'. Must be one of: {}",
                VALID_REVIEW_STATUSES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => REVIEW_PENDING,
            Self::Approved => REVIEW_APPROVED,
            Self::Rejected => REVIEW_REJECTED,
        }
    }

    /// Whether an administrator has already ruled on the form.
    pub fn is_reviewed(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/* --------------------------------------------------------------------------
Store account owner
-------------------------------------------------------------------------- */

pub const OWNER_TILARY: &str = "tilary";
pub const OWNER_CLIENT: &str = "client";

/// All valid store owner strings.
pub const VALID_STORE_OWNERS: &[&str] = &[OWNER_TILARY, OWNER_CLIENT];

/// Who holds the developer account a store listing is published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOwner {
    Tilary,
    Client,
}

impl StoreOwner {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            OWNER_TILARY => Ok(Self::Tilary),
            OWNER_CLIENT => Ok(Self::Client),
            _ => Err(CoreError::Validation(format!(
                "Invalid store owner '{s}'. Must be one of: {}",
                VALID_STORE_OWNERS.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tilary => OWNER_TILARY,
            Self::Client => OWNER_CLIENT,
        }
    }
}

/* --------------------------------------------------------------------------
Project status pipeline
-------------------------------------------------------------------------- */

/// Ordered production pipeline an administrator walks a project through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Pending,
    PreparingImages,
    ConfiguringFirebase,
    AdminPanelDelivered,
    TestingApp,
    SubmittedPlaystore,
    SubmittedAppstore,
    Completed,
}

impl ProjectStatus {
    /// Every step, in pipeline order.
    pub const ALL: [ProjectStatus; 8] = [
        Self::Pending,
        Self::PreparingImages,
        Self::ConfiguringFirebase,
        Self::AdminPanelDelivered,
        Self::TestingApp,
        Self::SubmittedPlaystore,
        Self::SubmittedAppstore,
        Self::Completed,
    ];

    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|step| step.as_str()).collect();
                CoreError::Validation(format!(
                    "Invalid project status '{s}'. Must be one of: {}",
                    valid.join(", ")
                ))
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PreparingImages => "preparing_images",
            Self::ConfiguringFirebase => "configuring_firebase",
            Self::AdminPanelDelivered => "admin_panel_delivered",
            Self::TestingApp => "testing_app",
            Self::SubmittedPlaystore => "submitted_playstore",
            Self::SubmittedAppstore => "submitted_appstore",
            Self::Completed => "completed",
        }
    }

    /// Zero-based position in the pipeline.
    pub fn step_index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|step| step == self)
            .unwrap_or_default()
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
