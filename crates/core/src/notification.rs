//! Notification kinds and message templates.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::inactivity::INACTIVITY_WINDOW_DAYS;

pub const KIND_FORM_COMPLETED: &str = "form_completed";
pub const KIND_FORM_UPDATED: &str = "form_updated";
pub const KIND_INACTIVE_WARNING: &str = "inactive_warning";
pub const KIND_CORRECTIONS_COMPLETED: &str = "corrections_completed";

/// All valid notification kind strings.
pub const VALID_NOTIFICATION_KINDS: &[&str] = &[
    KIND_FORM_COMPLETED,
    KIND_FORM_UPDATED,
    KIND_INACTIVE_WARNING,
    KIND_CORRECTIONS_COMPLETED,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    FormCompleted,
    FormUpdated,
    InactiveWarning,
    CorrectionsCompleted,
}

impl NotificationKind {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            KIND_FORM_COMPLETED => Ok(Self::FormCompleted),
            KIND_FORM_UPDATED => Ok(Self::FormUpdated),
            KIND_INACTIVE_WARNING => Ok(Self::InactiveWarning),
            KIND_CORRECTIONS_COMPLETED => Ok(Self::CorrectionsCompleted),
            _ => Err(CoreError::Validation(format!(
                "Invalid notification kind '{s}'. Must be one of: {}",
                VALID_NOTIFICATION_KINDS.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FormCompleted => KIND_FORM_COMPLETED,
            Self::FormUpdated => KIND_FORM_UPDATED,
            Self::InactiveWarning => KIND_INACTIVE_WARNING,
            Self::CorrectionsCompleted => KIND_CORRECTIONS_COMPLETED,
        }
    }
}

/* --------------------------------------------------------------------------
Message templates
-------------------------------------------------------------------------- */

/// Sent to the client when an administrator approves the form.
pub fn review_approved_message() -> String {
    "Your submission has been approved!".to_string()
}

/// Sent to the client when an administrator rejects the form.
pub fn review_rejected_message() -> String {
    "Your submission needs corrections. Check the project status section.".to_string()
}

/// Sent to administrators when a client edits an already reviewed form.
pub fn post_review_edit_message(client_name: &str) -> String {
    format!("{client_name} updated their form after review")
}

/// Sent to administrators when a client acknowledges corrections.
pub fn corrections_completed_message(client_name: &str) -> String {
    format!("{client_name} marked the requested corrections as complete")
}

/// Sent to administrators when a form reaches 100%.
pub fn form_completed_message(client_name: &str) -> String {
    format!("{client_name} completed their form (100%)")
}

/// Sent to administrators the first time a form passes the quarter mark.
pub fn quarter_reached_message(client_name: &str, percentage: i32) -> String {
    format!("{client_name} is making progress on their form ({percentage}% complete)")
}

/// Sent to administrators by the inactivity scan.
pub fn inactive_warning_message(client_name: &str, percentage: i32) -> String {
    format!(
        "{client_name} has been inactive for more than {INACTIVITY_WINDOW_DAYS} days ({percentage}% complete)"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for s in VALID_NOTIFICATION_KINDS {
            assert_eq!(NotificationKind::from_str_value(s).unwrap().as_str(), *s);
        }
        assert!(NotificationKind::from_str_value("review_approved").is_err());
    }

    #[test]
    fn test_inactive_message_includes_name_and_percentage() {
        assert_eq!(
            inactive_warning_message("Acme Rides", 42),
            "Acme Rides has been inactive for more than 2 days (42% complete)"
        );
    }

    #[test]
    fn test_client_name_templates() {
        assert!(post_review_edit_message("Acme").starts_with("Acme "));
        assert!(corrections_completed_message("Acme").contains("corrections"));
        assert!(quarter_reached_message("Acme", 25).contains("25%"));
    }
}
