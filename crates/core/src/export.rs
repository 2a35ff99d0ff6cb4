//! Plain-text rendering and archive layout for client data exports.

use std::fmt::Write;

use crate::form::ImageSource;
use crate::image_catalog::ImageKey;
use crate::types::Timestamp;

/// Name of the text summary inside an export archive.
pub const FORM_DATA_FILE: &str = "form_data.txt";

const RULE: &str = "===========================================";
const NOT_FILLED: &str = "Not filled";

/// Everything that goes into `form_data.txt`.
#[derive(Debug, Clone)]
pub struct ExportData<'a> {
    pub client_name: &'a str,
    pub client_email: &'a str,
    pub access_code: &'a str,
    pub driver_app_name: Option<&'a str>,
    pub passenger_app_name: Option<&'a str>,
    pub support_email: Option<&'a str>,
    pub playstore_driver_short: Option<&'a str>,
    pub playstore_driver_long: Option<&'a str>,
    pub playstore_passenger_short: Option<&'a str>,
    pub playstore_passenger_long: Option<&'a str>,
    pub appstore_driver_description: Option<&'a str>,
    pub appstore_passenger_description: Option<&'a str>,
    pub company_terms: Option<&'a str>,
    pub driver_terms: Option<&'a str>,
    pub passenger_terms: Option<&'a str>,
    pub playstore_owner_name: Option<&'a str>,
    pub playstore_owner_email: Option<&'a str>,
    pub appstore_owner_name: Option<&'a str>,
    pub appstore_owner_email: Option<&'a str>,
    pub image_source: Option<ImageSource>,
    pub images_uploaded: bool,
    pub status: &'a str,
    pub progress_percentage: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn or_blank(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_FILLED,
    }
}

fn heading(out: &mut String, title: &str) {
    // Writing to a String cannot fail.
    let _ = write!(out, "{RULE}\n{title}\n{RULE}\n\n");
}

/// Render the human-readable summary of a form.
pub fn render_form_text(data: &ExportData<'_>) -> String {
    let mut out = String::new();

    heading(&mut out, "CLIENT");
    let _ = write!(
        out,
        "Name: {}\nEmail: {}\nAccess code: {}\n\n",
        data.client_name, data.client_email, data.access_code
    );

    heading(&mut out, "APP SETUP");
    let _ = write!(
        out,
        "Driver app name: {}\nPassenger app name: {}\nSupport email: {}\n\n",
        or_blank(data.driver_app_name),
        or_blank(data.passenger_app_name),
        or_blank(data.support_email)
    );

    for (title, short, long) in [
        (
            "PLAY STORE - DRIVER APP",
            data.playstore_driver_short,
            data.playstore_driver_long,
        ),
        (
            "PLAY STORE - PASSENGER APP",
            data.playstore_passenger_short,
            data.playstore_passenger_long,
        ),
    ] {
        heading(&mut out, title);
        let _ = write!(
            out,
            "Short description:\n{}\n\nLong description:\n{}\n\n",
            or_blank(short),
            or_blank(long)
        );
    }

    for (title, description) in [
        ("APP STORE - DRIVER APP", data.appstore_driver_description),
        ("APP STORE - PASSENGER APP", data.appstore_passenger_description),
    ] {
        heading(&mut out, title);
        let _ = write!(out, "Description:\n{}\n\n", or_blank(description));
    }

    heading(&mut out, "TERMS OF USE");
    let _ = write!(
        out,
        "Company terms:\n{}\n\nDriver app terms:\n{}\n\nPassenger app terms:\n{}\n\n",
        or_blank(data.company_terms),
        or_blank(data.driver_terms),
        or_blank(data.passenger_terms)
    );

    heading(&mut out, "PUBLISHING ACCOUNTS");
    let _ = write!(
        out,
        "Play Store account holder: {}\nPlay Store account email: {}\n\n\
         App Store account holder: {}\nApp Store account email: {}\n\n",
        or_blank(data.playstore_owner_name),
        or_blank(data.playstore_owner_email),
        or_blank(data.appstore_owner_name),
        or_blank(data.appstore_owner_email)
    );

    heading(&mut out, "IMAGES");
    let note = match data.image_source {
        Some(ImageSource::Tilary) => {
            "Source: default asset pack\n\
             NOTE: default images are supplied by the studio and are not included in this archive."
        }
        Some(ImageSource::Custom) if data.images_uploaded => {
            "Source: client uploads\n\
             NOTE: all required custom images are included in this archive."
        }
        Some(ImageSource::Custom) => {
            "Source: client uploads\n\
             WARNING: the client has not uploaded every required image yet."
        }
        None => "Source: not chosen",
    };
    let _ = write!(out, "{note}\n\n");

    heading(&mut out, "PROGRESS");
    let _ = write!(
        out,
        "Status: {}\nProgress: {}%\nCreated at: {}\nUpdated at: {}\n",
        data.status,
        data.progress_percentage,
        data.created_at.format("%Y-%m-%d %H:%M UTC"),
        data.updated_at.format("%Y-%m-%d %H:%M UTC")
    );

    out
}

/// Path of an image inside the archive: `images/{app}/{store}/{type}/{file}`.
pub fn image_archive_path(key: &ImageKey, file_name: &str) -> String {
    let file_name = sanitize_component(file_name);
    format!(
        "images/{}/{}/{}/{file_name}",
        key.app_type.as_str(),
        key.store_type.as_str(),
        key.image_type.as_str()
    )
}

/// Download name for a client's archive, whitespace collapsed to `_`.
pub fn archive_file_name(client_name: &str) -> String {
    let joined = client_name.split_whitespace().collect::<Vec<_>>().join("_");
    let safe = sanitize_component(&joined);
    if safe.is_empty() {
        "client_form.zip".to_string()
    } else {
        format!("{safe}_form.zip")
    }
}

/// Strip path separators and quoting characters from a single path segment.
fn sanitize_component(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | '\\' | '"' | '\0'))
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_catalog::{AppType, ImageType, StoreType};
    use chrono::{TimeZone, Utc};

    fn sample() -> ExportData<'static> {
        let at = Utc.with_ymd_and_hms(2024, 5, 2, 14, 30, 0).unwrap();
        ExportData {
            client_name: "Acme Rides",
            client_email: "ops@acme.test",
            access_code: "ABC-123-XYZ",
            driver_app_name: Some("Acme Driver"),
            passenger_app_name: None,
            support_email: Some("  "),
            playstore_driver_short: None,
            playstore_driver_long: None,
            playstore_passenger_short: None,
            playstore_passenger_long: None,
            appstore_driver_description: None,
            appstore_passenger_description: None,
            company_terms: None,
            driver_terms: None,
            passenger_terms: None,
            playstore_owner_name: None,
            playstore_owner_email: None,
            appstore_owner_name: None,
            appstore_owner_email: None,
            image_source: Some(ImageSource::Custom),
            images_uploaded: false,
            status: "in_progress",
            progress_percentage: 8,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_text_contains_values_and_placeholders() {
        let text = render_form_text(&sample());
        assert!(text.contains("Name: Acme Rides"));
        assert!(text.contains("Driver app name: Acme Driver"));
        assert!(text.contains("Passenger app name: Not filled"));
        assert!(text.contains("Support email: Not filled"));
        assert!(text.contains("WARNING"));
        assert!(text.contains("Progress: 8%"));
        assert!(text.contains("2024-05-02 14:30 UTC"));
    }

    #[test]
    fn test_tilary_note() {
        let mut data = sample();
        data.image_source = Some(ImageSource::Tilary);
        assert!(render_form_text(&data).contains("default asset pack"));
    }

    #[test]
    fn test_image_path_keeps_multi_part_type() {
        let key = ImageKey::new(AppType::Driver, StoreType::Playstore, ImageType::Logo1024);
        assert_eq!(
            image_archive_path(&key, "logo.png"),
            "images/driver/playstore/logo_1024/logo.png"
        );
    }

    #[test]
    fn test_image_path_strips_traversal() {
        let key = ImageKey::new(AppType::Passenger, StoreType::Appstore, ImageType::Feature);
        assert_eq!(
            image_archive_path(&key, "../../etc/passwd"),
            "images/passenger/appstore/feature/etcpasswd"
        );
    }

    #[test]
    fn test_archive_file_name() {
        assert_eq!(archive_file_name("Acme  Rides Ltd"), "Acme_Rides_Ltd_form.zip");
        assert_eq!(archive_file_name("   "), "client_form.zip");
    }
}
