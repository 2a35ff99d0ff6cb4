//! Client data export as a zip archive.
//!
//! The archive holds `form_data.txt` plus every uploaded image under
//! `images/{app}/{store}/{type}/{file}`.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use intake_core::error::CoreError;
use intake_core::export::{
    archive_file_name, image_archive_path, render_form_text, ExportData, FORM_DATA_FILE,
};
use intake_core::types::DbId;
use intake_db::models::app_form::AppForm;
use intake_db::models::client::Client;
use intake_db::repositories::{AppFormRepo, ClientRepo, FormImageRepo};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// A finished archive ready to download.
#[derive(Debug)]
pub struct ClientExport {
    pub client: Client,
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Images that could not be read from the blob store and were skipped.
    pub skipped: Vec<String>,
}

/// Borrow the text-export view of a client and its form.
pub fn export_data<'a>(client: &'a Client, form: &'a AppForm) -> AppResult<ExportData<'a>> {
    Ok(ExportData {
        client_name: &client.name,
        client_email: &client.email,
        access_code: &client.access_code,
        driver_app_name: form.driver_app_name.as_deref(),
        passenger_app_name: form.passenger_app_name.as_deref(),
        support_email: form.support_email.as_deref(),
        playstore_driver_short: form.playstore_driver_short_description.as_deref(),
        playstore_driver_long: form.playstore_driver_long_description.as_deref(),
        playstore_passenger_short: form.playstore_passenger_short_description.as_deref(),
        playstore_passenger_long: form.playstore_passenger_long_description.as_deref(),
        appstore_driver_description: form.appstore_driver_description.as_deref(),
        appstore_passenger_description: form.appstore_passenger_description.as_deref(),
        company_terms: form.company_terms.as_deref(),
        driver_terms: form.driver_terms.as_deref(),
        passenger_terms: form.passenger_terms.as_deref(),
        playstore_owner_name: form.playstore_owner_name.as_deref(),
        playstore_owner_email: form.playstore_owner_email.as_deref(),
        appstore_owner_name: form.appstore_owner_name.as_deref(),
        appstore_owner_email: form.appstore_owner_email.as_deref(),
        image_source: form.image_source()?,
        images_uploaded: form.images_uploaded,
        status: &form.status,
        progress_percentage: form.progress_percentage,
        created_at: form.created_at,
        updated_at: form.updated_at,
    })
}

/// Write the text summary and the given files into a deflated zip.
pub fn build_archive(text: &str, files: &[(String, Vec<u8>)]) -> zip::result::ZipResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(FORM_DATA_FILE, options)?;
    zip.write_all(text.as_bytes())?;

    for (path, bytes) in files {
        zip.start_file(path.as_str(), options)?;
        zip.write_all(bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Gather a client's form and images into an archive.
///
/// An image whose blob is gone is skipped and reported rather than failing
/// the whole export.
pub async fn export_client(state: &AppState, client_id: DbId) -> AppResult<ClientExport> {
    let pool = &state.pool;
    let client = ClientRepo::find_by_id(pool, client_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Client",
                id: client_id,
            })
        })?;
    let form = AppFormRepo::find_by_client_id(pool, client.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Internal(format!(
                "Client {} has no form",
                client.id
            )))
        })?;

    let text = render_form_text(&export_data(&client, &form)?);

    let mut files = Vec::new();
    let mut skipped = Vec::new();
    let mut used = HashSet::new();
    for image in FormImageRepo::list_by_form(pool, form.id).await? {
        let key = image.key()?;
        let mut path = image_archive_path(&key, &image.file_name);
        // Two uploads may share a file name within one slot.
        if !used.insert(path.clone()) {
            path = image_archive_path(&key, &format!("{}_{}", image.id, image.file_name));
            used.insert(path.clone());
        }
        match state.blobs.get(&image.storage_path).await {
            Ok(bytes) => files.push((path, bytes)),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    image_id = image.id,
                    storage_path = %image.storage_path,
                    "Skipping unreadable image in export"
                );
                skipped.push(image.storage_path);
            }
        }
    }

    let bytes = build_archive(&text, &files)
        .map_err(|e| AppError::InternalError(format!("Failed to build archive: {e}")))?;

    tracing::info!(
        client_id,
        images = files.len(),
        skipped = skipped.len(),
        size = bytes.len(),
        "Client export built"
    );

    Ok(ClientExport {
        file_name: archive_file_name(&client.name),
        client,
        bytes,
        skipped,
    })
}
