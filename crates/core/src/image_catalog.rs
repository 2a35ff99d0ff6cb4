//! Store image slots, the required-image catalog, and upload validation.
//!
//! Every uploaded image is keyed by `(app_type, store_type, image_type)`.
//! [`SLOT_RULES`] says which keys accept uploads and what they must look
//! like; [`REQUIRED_IMAGES`] is the subset that must hold at least one image
//! before a custom-source form earns its image weight unit.

use std::collections::HashSet;
use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

use AppType::{Driver, Passenger};
use ImageType::{Banner1024, Feature, Logo1024, Logo352};
use StoreType::{Appstore, Playstore};

/* --------------------------------------------------------------------------
Key components
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppType {
    Driver,
    Passenger,
}

impl AppType {
    pub const ALL: [AppType; 2] = [Self::Driver, Self::Passenger];

    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            "driver" => Ok(Self::Driver),
            "passenger" => Ok(Self::Passenger),
            _ => Err(CoreError::Validation(format!(
                "Invalid app type '{s}'. Must be one of: driver, passenger"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::Passenger => "passenger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    Playstore,
    Appstore,
    /// Shared across both stores. Accepted in stored rows, never uploadable.
    Both,
}

impl StoreType {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            "playstore" => Ok(Self::Playstore),
            "appstore" => Ok(Self::Appstore),
            "both" => Ok(Self::Both),
            _ => Err(CoreError::Validation(format!(
                "Invalid store type '{s}'. Must be one of: playstore, appstore, both"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playstore => "playstore",
            Self::Appstore => "appstore",
            Self::Both => "both",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageType {
    #[serde(rename = "logo_1024")]
    Logo1024,
    #[serde(rename = "logo_352")]
    Logo352,
    #[serde(rename = "feature")]
    Feature,
    #[serde(rename = "banner_1024")]
    Banner1024,
}

impl ImageType {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            "logo_1024" => Ok(Self::Logo1024),
            "logo_352" => Ok(Self::Logo352),
            "feature" => Ok(Self::Feature),
            "banner_1024" => Ok(Self::Banner1024),
            _ => Err(CoreError::Validation(format!(
                "Invalid image type '{s}'. Must be one of: logo_1024, logo_352, feature, banner_1024"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logo1024 => "logo_1024",
            Self::Logo352 => "logo_352",
            Self::Feature => "feature",
            Self::Banner1024 => "banner_1024",
        }
    }
}

/// Composite key identifying one image category on a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageKey {
    pub app_type: AppType,
    pub store_type: StoreType,
    pub image_type: ImageType,
}

impl ImageKey {
    pub const fn new(app_type: AppType, store_type: StoreType, image_type: ImageType) -> Self {
        Self {
            app_type,
            store_type,
            image_type,
        }
    }

    /// Parse the three stored string columns.
    pub fn parse(app_type: &str, store_type: &str, image_type: &str) -> Result<Self, CoreError> {
        Ok(Self {
            app_type: AppType::from_str_value(app_type)?,
            store_type: StoreType::from_str_value(store_type)?,
            image_type: ImageType::from_str_value(image_type)?,
        })
    }

    /// Human-readable category label, e.g. `driver_playstore_logo_1024`.
    pub fn category(&self) -> String {
        format!(
            "{}_{}_{}",
            self.app_type.as_str(),
            self.store_type.as_str(),
            self.image_type.as_str()
        )
    }
}

/* --------------------------------------------------------------------------
Required catalog
-------------------------------------------------------------------------- */

/// Every key that must hold at least one upload for the custom-image unit
/// to count as filled. Banners are optional.
pub const REQUIRED_IMAGES: [ImageKey; 8] = [
    ImageKey::new(Driver, Playstore, Logo1024),
    ImageKey::new(Driver, Playstore, Logo352),
    ImageKey::new(Driver, Playstore, Feature),
    ImageKey::new(Driver, Appstore, Feature),
    ImageKey::new(Passenger, Playstore, Logo1024),
    ImageKey::new(Passenger, Playstore, Logo352),
    ImageKey::new(Passenger, Playstore, Feature),
    ImageKey::new(Passenger, Appstore, Feature),
];

/// Required keys with no matching upload, in catalog order.
pub fn missing_required<'a, I>(uploaded: I) -> Vec<ImageKey>
where
    I: IntoIterator<Item = &'a ImageKey>,
{
    let present: HashSet<ImageKey> = uploaded.into_iter().copied().collect();
    REQUIRED_IMAGES
        .iter()
        .filter(|key| !present.contains(key))
        .copied()
        .collect()
}

/// True when every entry of [`REQUIRED_IMAGES`] has at least one upload.
pub fn catalog_satisfied<'a, I>(uploaded: I) -> bool
where
    I: IntoIterator<Item = &'a ImageKey>,
{
    missing_required(uploaded).is_empty()
}

/* --------------------------------------------------------------------------
Slot rules
-------------------------------------------------------------------------- */

/// Upload constraints for one key, applied to both app types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotRule {
    pub store_type: StoreType,
    pub image_type: ImageType,
    /// Accepted `(width, height)` pairs.
    pub dimensions: &'static [(u32, u32)],
    /// Maximum stored images for this key.
    pub max_count: usize,
    /// Minimum images a listing needs before store submission.
    pub min_count: usize,
}

pub const SLOT_RULES: &[SlotRule] = &[
    SlotRule {
        store_type: Playstore,
        image_type: Logo1024,
        dimensions: &[(1024, 1024)],
        max_count: 1,
        min_count: 1,
    },
    SlotRule {
        store_type: Playstore,
        image_type: Logo352,
        dimensions: &[(352, 68)],
        max_count: 1,
        min_count: 1,
    },
    SlotRule {
        store_type: Playstore,
        image_type: Feature,
        dimensions: &[(1243, 2486)],
        max_count: 8,
        min_count: 4,
    },
    SlotRule {
        store_type: Playstore,
        image_type: Banner1024,
        dimensions: &[(1024, 500)],
        max_count: 1,
        min_count: 0,
    },
    // Two device classes, up to eight screenshots each.
    SlotRule {
        store_type: Appstore,
        image_type: Feature,
        dimensions: &[(1242, 2688), (1320, 2868)],
        max_count: 16,
        min_count: 4,
    },
];

/// Look up the upload rule for a key, if the key accepts uploads at all.
pub fn slot_rule(key: &ImageKey) -> Option<&'static SlotRule> {
    SLOT_RULES
        .iter()
        .find(|rule| rule.store_type == key.store_type && rule.image_type == key.image_type)
}

/// Every uploadable key across both app types, in display order.
pub fn all_slots() -> Vec<(ImageKey, &'static SlotRule)> {
    AppType::ALL
        .iter()
        .flat_map(|app| {
            SLOT_RULES
                .iter()
                .map(move |rule| (ImageKey::new(*app, rule.store_type, rule.image_type), rule))
        })
        .collect()
}

/// Metadata extracted from an accepted upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedImage {
    pub width: u32,
    pub height: u32,
}

impl ValidatedImage {
    /// Stored `"WxH"` form.
    pub fn dimensions_label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Validate an upload against its slot.
///
/// Checks, in order: the key accepts uploads, the slot is not full, the
/// payload is a PNG, and the header dimensions match the slot.
pub fn validate_upload(
    key: &ImageKey,
    bytes: &[u8],
    existing_count: usize,
) -> Result<ValidatedImage, CoreError> {
    let rule = slot_rule(key).ok_or_else(|| {
        CoreError::Validation(format!("Uploads are not accepted for '{}'", key.category()))
    })?;

    if existing_count >= rule.max_count {
        return Err(CoreError::Validation(format!(
            "'{}' already holds the maximum of {} image(s)",
            key.category(),
            rule.max_count
        )));
    }

    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png) => {}
        _ => {
            return Err(CoreError::Validation(
                "Only PNG images are accepted".to_string(),
            ))
        }
    }

    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")))?
        .into_dimensions()
        .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")))?;

    if !rule.dimensions.contains(&(width, height)) {
        let expected: Vec<String> = rule
            .dimensions
            .iter()
            .map(|(w, h)| format!("{w}x{h}"))
            .collect();
        return Err(CoreError::Validation(format!(
            "'{}' must be {} pixels (got {width}x{height})",
            key.category(),
            expected.join(" or ")
        )));
    }

    Ok(ValidatedImage { width, height })
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
