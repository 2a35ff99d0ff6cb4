//! Review and correction state machine.
//!
//! Administrators approve or reject a submission; after a rejection the
//! client edits the form and acknowledges the corrections. The functions
//! here decide what a transition writes. Persisting the result and sending
//! notifications is the caller's job.

use crate::error::CoreError;
use crate::form::{FormStatus, ReviewStatus};
use crate::progress::derive_status;

/// Maximum length of rejection feedback.
pub const MAX_FEEDBACK_LENGTH: usize = 10_000;

/// An approved form at or above this percentage is promoted to 100.
pub const APPROVAL_PROMOTION_THRESHOLD: i32 = 95;

/// Column values written by an approve or reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub review_status: ReviewStatus,
    pub review_feedback: Option<String>,
    pub progress_percentage: i32,
    pub status: FormStatus,
}

/// Validate and normalize rejection feedback.
///
/// Returns the trimmed text. Empty or whitespace-only feedback is an error.
pub fn validate_feedback(feedback: Option<&str>) -> Result<String, CoreError> {
    let trimmed = feedback.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Feedback is required when rejecting a submission".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_FEEDBACK_LENGTH {
        return Err(CoreError::Validation(format!(
            "Feedback exceeds maximum length of {MAX_FEEDBACK_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Outcome of approving a form with the given stored percentage.
///
/// Near-complete forms are promoted to 100 and `completed`. Anything below
/// the threshold keeps its percentage. Optional feedback is kept as a note.
pub fn approve(current_percentage: i32, feedback: Option<&str>) -> ReviewOutcome {
    let progress_percentage = if current_percentage >= APPROVAL_PROMOTION_THRESHOLD {
        100
    } else {
        current_percentage
    };
    let review_feedback = feedback
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string);

    ReviewOutcome {
        review_status: ReviewStatus::Approved,
        review_feedback,
        progress_percentage,
        status: derive_status(progress_percentage),
    }
}

/// Outcome of rejecting a form. Fails without side effects on bad feedback.
pub fn reject(current_percentage: i32, feedback: Option<&str>) -> Result<ReviewOutcome, CoreError> {
    let feedback = validate_feedback(feedback)?;
    Ok(ReviewOutcome {
        review_status: ReviewStatus::Rejected,
        review_feedback: Some(feedback),
        progress_percentage: current_percentage,
        status: derive_status(current_percentage),
    })
}

/// Whether a client edit should claim the one-shot change notice.
pub fn needs_post_review_notice(review_status: ReviewStatus, admin_notified: bool) -> bool {
    review_status.is_reviewed() && !admin_notified
}

/// Corrections can only be acknowledged on a rejected form.
pub fn can_mark_corrections_complete(review_status: ReviewStatus) -> Result<(), CoreError> {
    if review_status == ReviewStatus::Rejected {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Corrections can only be completed on a rejected form (review status is '{}')",
            review_status.as_str()
        )))
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_empty_feedback_rejected() {
        assert_matches!(validate_feedback(None), Err(CoreError::Validation(_)));
        assert_matches!(validate_feedback(Some("")), Err(CoreError::Validation(_)));
        assert_matches!(validate_feedback(Some("  \n ")), Err(CoreError::Validation(_)));
    }

    #[test]
    fn test_feedback_is_trimmed() {
        assert_eq!(validate_feedback(Some("  fix logo \n")).unwrap(), "fix logo");
    }

    #[test]
    fn test_oversized_feedback_rejected() {
        let long = "x".repeat(MAX_FEEDBACK_LENGTH + 1);
        assert!(validate_feedback(Some(&long)).is_err());
    }

    #[test]
    fn test_approve_promotes_near_complete() {
        for pct in [95, 96, 99, 100] {
            let outcome = approve(pct, None);
            assert_eq!(outcome.progress_percentage, 100);
            assert_eq!(outcome.status, FormStatus::Completed);
            assert_eq!(outcome.review_status, ReviewStatus::Approved);
        }
    }

    #[test]
    fn test_approve_below_threshold_keeps_percentage() {
        let outcome = approve(92, Some("looks good"));
        assert_eq!(outcome.progress_percentage, 92);
        assert_eq!(outcome.status, FormStatus::InProgress);
        assert_eq!(outcome.review_feedback.as_deref(), Some("looks good"));
    }

    #[test]
    fn test_approve_drops_blank_feedback() {
        assert_eq!(approve(50, Some("   ")).review_feedback, None);
    }

    #[test]
    fn test_reject_keeps_percentage() {
        let outcome = reject(92, Some("Logo is blurry")).unwrap();
        assert_eq!(outcome.review_status, ReviewStatus::Rejected);
        assert_eq!(outcome.progress_percentage, 92);
        assert_eq!(outcome.review_feedback.as_deref(), Some("Logo is blurry"));
    }

    #[test]
    fn test_reject_without_feedback_fails() {
        assert_matches!(reject(50, Some(" ")), Err(CoreError::Validation(_)));
    }

    #[test]
    fn test_post_review_notice_only_once() {
        assert!(!needs_post_review_notice(ReviewStatus::Pending, false));
        assert!(needs_post_review_notice(ReviewStatus::Rejected, false));
        assert!(needs_post_review_notice(ReviewStatus::Approved, false));
        assert!(!needs_post_review_notice(ReviewStatus::Rejected, true));
    }

    #[test]
    fn test_corrections_require_rejected() {
        assert!(can_mark_corrections_complete(ReviewStatus::Rejected).is_ok());
        assert_matches!(
            can_mark_corrections_complete(ReviewStatus::Pending),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            can_mark_corrections_complete(ReviewStatus::Approved),
            Err(CoreError::Conflict(_))
        );
    }
}
