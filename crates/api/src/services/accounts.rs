//! Provisioning and removal of client and administrator accounts.
//!
//! Accounts span the identity service and the database, so both directions
//! run as sagas: creation undoes the identity when the rows cannot be
//! written, and deletion retries the external cleanup and reports whatever
//! could not be removed.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use intake_core::client::{generate_access_code, initial_password, CLIENT_STATUS_INACTIVE};
use intake_core::error::CoreError;
use intake_core::roles::{ROLE_ADMIN, ROLE_CLIENT};
use intake_core::types::DbId;
use intake_db::models::client::{ClientAccount, CreateClientAccount};
use intake_db::models::profile::{CreateProfile, Profile};
use intake_db::repositories::{ClientRepo, FormImageRepo, ProfileRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::ValidateEmail;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::saga::{retry, Saga};
use crate::services::activity::{
    self, Activity, ACTION_ADMIN_CREATED, ACTION_CLIENT_CREATED, ACTION_CLIENT_DELETED,
    TARGET_CLIENT, TARGET_PROFILE,
};
use crate::services::images::{BLOB_REMOVE_ATTEMPTS, BLOB_REMOVE_BACKOFF};
use crate::state::AppState;

/// Draws before giving up on finding an unused access code.
const ACCESS_CODE_ATTEMPTS: usize = 8;

const IDENTITY_DELETE_ATTEMPTS: u32 = 3;
const IDENTITY_DELETE_BACKOFF: Duration = Duration::from_millis(500);

/// Minimum administrator password length.
pub const MIN_ADMIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: String,
}

/// A new client account together with the code the client signs in with.
#[derive(Debug, Serialize)]
pub struct CreatedClient {
    #[serde(flatten)]
    pub account: ClientAccount,
    pub access_code: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Outcome of deleting a client.
#[derive(Debug, Serialize)]
pub struct DeletionReport {
    pub client_id: DbId,
    pub removed_images: usize,
    /// Blobs or identities that could not be removed.
    pub residue: Vec<String>,
}

fn normalized_name_and_email(name: &str, email: &str) -> AppResult<(String, String)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Name is required".into()).into());
    }
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(CoreError::Validation(format!("'{email}' is not a valid email address")).into());
    }
    Ok((name.to_string(), email))
}

async fn unused_access_code(pool: &PgPool) -> AppResult<String> {
    for _ in 0..ACCESS_CODE_ATTEMPTS {
        let code = generate_access_code(&mut rand::rng());
        if !ClientRepo::access_code_taken(pool, &code).await? {
            return Ok(code);
        }
    }
    Err(AppError::InternalError(
        "Could not allocate an unused access code".into(),
    ))
}

/* --------------------------------------------------------------------------
Clients
-------------------------------------------------------------------------- */

/// Create the identity, then the profile, client and empty form.
///
/// If the rows cannot be written the identity is deleted again.
pub async fn create_client(
    state: &AppState,
    admin: &AuthUser,
    input: &CreateClientRequest,
) -> AppResult<CreatedClient> {
    let (name, email) = normalized_name_and_email(&input.name, &input.email)?;
    let pool = &state.pool;
    let access_code = unused_access_code(pool).await?;

    let mut saga = Saga::new("create_client");

    let identity = saga
        .run(
            "create_identity",
            state.identity.create_user(
                &email,
                &initial_password(&access_code),
                &name,
                ROLE_CLIENT,
            ),
        )
        .await?;
    {
        let provider = Arc::clone(&state.identity);
        let id = identity.id;
        saga.on_rollback("create_identity", move || {
            async move { provider.delete_user(id).await.map_err(|e| e.to_string()) }.boxed()
        });
    }

    let account_input = CreateClientAccount {
        auth_user_id: identity.id,
        name,
        email,
        access_code: access_code.clone(),
        created_by: Some(admin.profile_id),
    };
    let account = saga
        .run("insert_rows", ClientRepo::create_account(pool, &account_input))
        .await?;
    saga.commit();

    tracing::info!(
        client_id = account.client.id,
        admin_profile_id = admin.profile_id,
        "Client account created"
    );

    activity::record(
        pool,
        admin,
        Activity {
            action_type: ACTION_CLIENT_CREATED,
            description: format!("Created client {}", account.client.name),
            target: Some((TARGET_CLIENT, account.client.id, &account.client.name)),
            metadata: Some(serde_json::json!({ "email": account.client.email })),
        },
    )
    .await;

    Ok(CreatedClient {
        account,
        access_code,
    })
}

/// Deactivate, delete the rows, then remove blobs and the identity.
///
/// A failure before the rows are gone restores the previous status. After
/// that point nothing is rolled back; cleanup is retried and whatever is
/// left is returned in the report.
pub async fn delete_client(
    state: &AppState,
    admin: &AuthUser,
    client_id: DbId,
) -> AppResult<DeletionReport> {
    let pool = &state.pool;
    let client = ClientRepo::find_by_id(pool, client_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Client",
                id: client_id,
            })
        })?;
    let profile = ProfileRepo::find_by_id(pool, client.profile_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Profile",
                id: client.profile_id,
            })
        })?;
    let paths = FormImageRepo::storage_paths_for_client(pool, client.id).await?;

    let mut saga = Saga::new("delete_client");

    saga.run(
        "deactivate",
        ClientRepo::update_status(pool, client.id, CLIENT_STATUS_INACTIVE),
    )
    .await?;
    {
        let pool = pool.clone();
        let previous = client.status.clone();
        saga.on_rollback("deactivate", move || {
            async move {
                ClientRepo::update_status(&pool, client_id, &previous)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            }
            .boxed()
        });
    }

    let deleted = saga
        .run("delete_rows", ClientRepo::delete_account(pool, client.id))
        .await?;
    saga.commit();
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id: client_id,
        }));
    }

    let mut residue = Vec::new();
    let mut removed_images = 0;
    for path in &paths {
        let blobs = &state.blobs;
        match retry(
            "remove_blob",
            BLOB_REMOVE_ATTEMPTS,
            BLOB_REMOVE_BACKOFF,
            move || blobs.remove(path),
        )
        .await
        {
            Ok(()) => removed_images += 1,
            Err(e) => residue.push(format!("blob {path}: {e}")),
        }
    }

    let identity = &state.identity;
    let auth_user_id = profile.auth_user_id;
    if let Err(e) = retry(
        "delete_identity",
        IDENTITY_DELETE_ATTEMPTS,
        IDENTITY_DELETE_BACKOFF,
        move || identity.delete_user(auth_user_id),
    )
    .await
    {
        residue.push(format!("identity {auth_user_id}: {e}"));
    }

    if residue.is_empty() {
        tracing::info!(client_id, removed_images, "Client deleted");
    } else {
        tracing::error!(client_id, removed_images, residue = ?residue, "Client deleted with residue");
    }

    activity::record(
        pool,
        admin,
        Activity {
            action_type: ACTION_CLIENT_DELETED,
            description: format!("Deleted client {}", client.name),
            target: Some((TARGET_CLIENT, client.id, &client.name)),
            metadata: Some(serde_json::json!({
                "removed_images": removed_images,
                "residue": residue,
            })),
        },
    )
    .await;

    Ok(DeletionReport {
        client_id,
        removed_images,
        residue,
    })
}

/* --------------------------------------------------------------------------
Administrators
-------------------------------------------------------------------------- */

/// Create an administrator identity and its profile.
pub async fn create_admin(
    state: &AppState,
    admin: &AuthUser,
    input: &CreateAdminRequest,
) -> AppResult<Profile> {
    let (name, email) = normalized_name_and_email(&input.name, &input.email)?;
    if input.password.chars().count() < MIN_ADMIN_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_ADMIN_PASSWORD_LEN} characters"
        ))
        .into());
    }
    let pool = &state.pool;

    let mut saga = Saga::new("create_admin");
    let identity = saga
        .run(
            "create_identity",
            state
                .identity
                .create_user(&email, &input.password, &name, ROLE_ADMIN),
        )
        .await?;
    {
        let provider = Arc::clone(&state.identity);
        let id = identity.id;
        saga.on_rollback("create_identity", move || {
            async move { provider.delete_user(id).await.map_err(|e| e.to_string()) }.boxed()
        });
    }

    let profile_input = CreateProfile {
        auth_user_id: identity.id,
        email,
        name,
        role: ROLE_ADMIN.to_string(),
    };
    let profile = saga
        .run("insert_profile", ProfileRepo::create(pool, &profile_input))
        .await?;
    saga.commit();

    tracing::info!(profile_id = profile.id, "Administrator created");

    activity::record(
        pool,
        admin,
        Activity {
            action_type: ACTION_ADMIN_CREATED,
            description: format!("Created administrator {}", profile.name),
            target: Some((TARGET_PROFILE, profile.id, &profile.name)),
            metadata: None,
        },
    )
    .await;

    Ok(profile)
}
