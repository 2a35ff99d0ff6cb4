//! Client for the external identity service.
//!
//! Sign-in and session issuance live in the identity service. This API only
//! provisions and removes identities through its admin endpoints, using a
//! service key.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Errors from the identity layer.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The identity service returned a non-2xx status code.
    #[error("identity service error ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// A user as returned by the identity admin API.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a confirmed identity and return its id.
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: &str,
    ) -> Result<IdentityUser, IdentityError>;

    /// Delete an identity. Deleting an unknown id succeeds.
    async fn delete_user(&self, id: Uuid) -> Result<(), IdentityError>;
}

/// HTTP client for the identity admin API.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl HttpIdentityProvider {
    /// * `base_url` - e.g. `http://localhost:9999`.
    pub fn new(base_url: String, service_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            service_key,
        }
    }

    fn admin_url(&self, suffix: &str) -> String {
        format!("{}/admin/users{suffix}", self.base_url)
    }

    /// Return the response unchanged on success, or a
    /// [`IdentityError::Rejected`] carrying the status and body.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, IdentityError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: &str,
    ) -> Result<IdentityUser, IdentityError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "email_confirm": true,
            "user_metadata": { "name": name, "role": role },
        });

        let response = self
            .client
            .post(self.admin_url(""))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.json::<IdentityUser>().await?)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), IdentityError> {
        let response = self
            .client
            .delete(self.admin_url(&format!("/{id}")))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// In-process identity provider for tests and local runs without an
/// identity service.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    users: Mutex<HashMap<Uuid, String>>,
    /// When set, the next `create_user` call fails with this status.
    fail_next_create: Mutex<Option<u16>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.users.lock().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }

    pub async fn fail_next_create(&self, status: u16) {
        *self.fail_next_create.lock().await = Some(status);
    }

    /// Register an identity with a known id, as if created out of band.
    pub async fn insert(&self, id: Uuid, email: &str) {
        self.users.lock().await.insert(id, email.to_string());
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_user(
        &self,
        email: &str,
        _password: &str,
        _name: &str,
        _role: &str,
    ) -> Result<IdentityUser, IdentityError> {
        if let Some(status) = self.fail_next_create.lock().await.take() {
            return Err(IdentityError::Rejected {
                status,
                body: "injected failure".to_string(),
            });
        }

        let mut users = self.users.lock().await;
        if users.values().any(|e| e.eq_ignore_ascii_case(email)) {
            return Err(IdentityError::Rejected {
                status: 422,
                body: "email already registered".to_string(),
            });
        }
        let id = Uuid::new_v4();
        users.insert(id, email.to_string());
        Ok(IdentityUser {
            id,
            email: Some(email.to_string()),
        })
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), IdentityError> {
        self.users.lock().await.remove(&id);
        Ok(())
    }
}
