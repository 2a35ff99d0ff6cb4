//! Inactivity window rules for the periodic client scan.

use chrono::Duration;

use crate::types::Timestamp;

/// A form untouched for longer than this is considered inactive.
pub const INACTIVITY_WINDOW_DAYS: i64 = 2;

/// Forms last active before this instant are inactive.
pub fn inactivity_cutoff(now: Timestamp) -> Timestamp {
    now - Duration::days(INACTIVITY_WINDOW_DAYS)
}

/// Whether a form should raise an inactivity warning.
///
/// Completed forms and forms with no recorded activity are skipped.
pub fn is_inactive(last_activity: Option<Timestamp>, progress_percentage: i32, now: Timestamp) -> bool {
    match last_activity {
        Some(at) => progress_percentage < 100 && at < inactivity_cutoff(now),
        None => false,
    }
}

/// Whether a previous warning still covers the current window.
pub fn warned_within_window(last_warning: Option<Timestamp>, now: Timestamp) -> bool {
    last_warning.is_some_and(|at| at >= inactivity_cutoff(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_stale_incomplete_form_is_inactive() {
        let last = now() - Duration::days(3);
        assert!(is_inactive(Some(last), 40, now()));
    }

    #[test]
    fn test_recent_or_complete_form_is_not_inactive() {
        assert!(!is_inactive(Some(now() - Duration::hours(47)), 40, now()));
        assert!(!is_inactive(Some(now() - Duration::days(5)), 100, now()));
        assert!(!is_inactive(None, 0, now()));
    }

    #[test]
    fn test_exact_cutoff_is_not_inactive() {
        assert!(!is_inactive(Some(inactivity_cutoff(now())), 10, now()));
    }

    #[test]
    fn test_warning_window() {
        assert!(warned_within_window(Some(now() - Duration::days(1)), now()));
        assert!(!warned_within_window(Some(now() - Duration::days(3)), now()));
        assert!(!warned_within_window(None, now()));
    }
}
