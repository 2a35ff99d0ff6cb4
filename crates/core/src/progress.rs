//! Completion percentage and status derivation.
//!
//! A form has twelve equally weighted units: the eleven text fields in
//! [`WEIGHTED_TEXT_FIELDS`](crate::form::WEIGHTED_TEXT_FIELDS) plus one unit
//! for images. The percentage is always recomputed from source values and
//! never edited directly.

use serde::Serialize;

use crate::form::{is_filled, FormStatus, ImageSource, WEIGHTED_FIELD_COUNT};
use crate::image_catalog::{catalog_satisfied, ImageKey};

/// Text fields plus the image unit.
pub const TOTAL_WEIGHT: u32 = WEIGHTED_FIELD_COUNT as u32 + 1;

/// First-time upward crossing of this percentage notifies administrators.
pub const QUARTER_MILESTONE: i32 = 25;

/// Everything the calculator needs to know about a form.
#[derive(Debug, Clone)]
pub struct ProgressInput<'a> {
    /// Values of the weighted text fields, in catalog order.
    pub text_values: [Option<&'a str>; WEIGHTED_FIELD_COUNT],
    pub image_source: Option<ImageSource>,
    /// Keys of every image currently stored for the form.
    pub uploaded: &'a [ImageKey],
}

/// Result of a progress computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub filled_text: u32,
    pub image_unit_filled: bool,
    /// New value for the `images_uploaded` cache.
    pub images_uploaded: bool,
    pub percentage: i32,
    pub status: FormStatus,
}

/// Round `100 * filled / total` half up. `total` must be non-zero.
pub fn percentage(filled: u32, total: u32) -> i32 {
    let filled = filled.min(total);
    ((200 * filled + total) / (2 * total)) as i32
}

/// Map a percentage onto the three form statuses.
pub fn derive_status(percentage: i32) -> FormStatus {
    if percentage >= 100 {
        FormStatus::Completed
    } else if percentage > 0 {
        FormStatus::InProgress
    } else {
        FormStatus::NotStarted
    }
}

/// Whether the images-uploaded cache should read true for this source.
///
/// Tilary forms use the default asset pack and are always satisfied. Forms
/// that have not chosen a source yet are never satisfied.
pub fn images_complete(image_source: Option<ImageSource>, uploaded: &[ImageKey]) -> bool {
    match image_source {
        Some(ImageSource::Tilary) => true,
        Some(ImageSource::Custom) => catalog_satisfied(uploaded),
        None => false,
    }
}

/// Compute filled units, percentage and status for a form.
pub fn compute_progress(input: &ProgressInput<'_>) -> ProgressReport {
    let filled_text = input
        .text_values
        .iter()
        .filter(|v| is_filled(**v))
        .count() as u32;

    let image_unit_filled = images_complete(input.image_source, input.uploaded);
    let filled = filled_text + u32::from(image_unit_filled);
    let percentage = percentage(filled, TOTAL_WEIGHT);

    ProgressReport {
        filled_text,
        image_unit_filled,
        images_uploaded: image_unit_filled,
        percentage,
        status: derive_status(percentage),
    }
}

/* --------------------------------------------------------------------------
Crossing triggers
-------------------------------------------------------------------------- */

/// Milestones that fire a notice to administrators on client-side recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressCrossing {
    /// Progress moved from below 100 to 100.
    Completed,
    /// Progress crossed the quarter mark upward for the first time.
    QuarterReached,
}

/// Determine which milestone, if any, a recompute crossed.
///
/// Reaching 100 reports only `Completed`, even when the quarter mark was
/// skipped in the same step. Callers record the quarter milestone as
/// notified whenever the result is `Some`.
pub fn detect_crossing(
    previous: i32,
    current: i32,
    quarter_already_notified: bool,
) -> Option<ProgressCrossing> {
    if previous < 100 && current >= 100 {
        return Some(ProgressCrossing::Completed);
    }
    if !quarter_already_notified && previous < QUARTER_MILESTONE && current >= QUARTER_MILESTONE {
        return Some(ProgressCrossing::QuarterReached);
    }
    None
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
