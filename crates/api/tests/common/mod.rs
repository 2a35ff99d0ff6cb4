#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use intake_api::auth::jwt::{issue_token, JwtConfig};
use intake_api::config::ServerConfig;
use intake_api::identity::InMemoryIdentityProvider;
use intake_api::middleware::auth::AuthUser;
use intake_api::router::build_app_router;
use intake_api::services::accounts::{self, CreateClientRequest, CreatedClient};
use intake_api::state::AppState;
use intake_api::storage::LocalBlobStore;
use intake_core::clock::FixedClock;
use intake_core::roles::ROLE_ADMIN;
use intake_db::models::profile::{CreateProfile, Profile};
use intake_db::repositories::ProfileRepo;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(storage_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            audience: None,
        },
        storage_root,
        public_base_url: "http://localhost:3000/files".to_string(),
        identity_url: "http://identity.invalid".to_string(),
        identity_service_key: String::new(),
        inactivity_scan_interval_secs: 3600,
        image_sync_interval_secs: 60,
        max_upload_bytes: 10 * 1024 * 1024,
    }
}

/// The router plus handles on the fakes behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub identity: Arc<InMemoryIdentityProvider>,
    pub clock: Arc<FixedClock>,
    pub storage: TempDir,
}

impl TestApp {
    /// A fresh handle on the router for one request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub fn pool(&self) -> &PgPool {
        &self.state.pool
    }

    pub fn token_for(&self, profile: &Profile) -> String {
        issue_token(
            profile.auth_user_id,
            Some(&profile.email),
            3600,
            &self.state.config.jwt,
        )
        .unwrap()
    }
}

/// Build the full application router with all middleware layers, backed by
/// an in-memory identity provider, a temporary blob store and a fixed clock.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let storage = TempDir::new().unwrap();
    let config = test_config(storage.path().to_path_buf());
    let identity = Arc::new(InMemoryIdentityProvider::new());
    let clock = Arc::new(FixedClock::new(Utc::now()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        blobs: Arc::new(LocalBlobStore::new(
            storage.path(),
            config.public_base_url.clone(),
        )),
        identity: identity.clone(),
        clock: clock.clone(),
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        identity,
        clock,
        storage,
    }
}

/* --------------------------------------------------------------------------
Seeding
-------------------------------------------------------------------------- */

/// An administrator profile and a token for it.
pub struct SeededAdmin {
    pub profile: Profile,
    pub token: String,
}

impl SeededAdmin {
    pub fn auth_user(&self) -> AuthUser {
        AuthUser {
            profile_id: self.profile.id,
            auth_user_id: self.profile.auth_user_id,
            email: self.profile.email.clone(),
            name: self.profile.name.clone(),
            role: self.profile.role.clone(),
        }
    }
}

/// A client account and a token for its profile.
pub struct SeededClient {
    pub created: CreatedClient,
    pub token: String,
}

impl SeededClient {
    pub fn client_id(&self) -> i64 {
        self.created.account.client.id
    }

    pub fn form_id(&self) -> i64 {
        self.created.account.form.id
    }
}

pub async fn seed_admin(app: &TestApp, email: &str) -> SeededAdmin {
    let auth_user_id = Uuid::new_v4();
    app.identity.insert(auth_user_id, email).await;
    let profile = ProfileRepo::create(
        app.pool(),
        &CreateProfile {
            auth_user_id,
            email: email.to_string(),
            name: "Admin".to_string(),
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await
    .unwrap();
    let token = app.token_for(&profile);
    SeededAdmin { profile, token }
}

pub async fn seed_client(app: &TestApp, admin: &SeededAdmin, name: &str) -> SeededClient {
    let email = format!("{}@client.test", name.to_lowercase().replace(' ', "."));
    let created = accounts::create_client(
        &app.state,
        &admin.auth_user(),
        &CreateClientRequest {
            name: name.to_string(),
            email,
        },
    )
    .await
    .unwrap();
    let token = app.token_for(&created.account.profile);
    SeededClient { created, token }
}

/* --------------------------------------------------------------------------
Requests
-------------------------------------------------------------------------- */

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, request(Method::GET, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        request(Method::DELETE, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_empty(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        request(Method::POST, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(
        app,
        request(method, uri, Some(token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send_json(app, Method::POST, uri, token, body).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send_json(app, Method::PUT, uri, token, body).await
}

pub async fn patch_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send_json(app, Method::PATCH, uri, token, body).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/* --------------------------------------------------------------------------
Uploads
-------------------------------------------------------------------------- */

/// A blank PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = image::DynamicImage::ImageLuma8(image::GrayImage::new(width, height));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

const BOUNDARY: &str = "intake-test-boundary";

/// POST a multipart image upload to `/api/v1/me/form/images`.
pub async fn upload(
    app: Router,
    token: &str,
    key: (&str, &str, &str),
    file_name: &str,
    bytes: &[u8],
) -> Response<Body> {
    let (app_type, store_type, image_type) = key;
    let mut body = Vec::new();
    for (name, value) in [
        ("app_type", app_type),
        ("store_type", store_type),
        ("image_type", image_type),
    ] {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    send(
        app,
        request(Method::POST, "/api/v1/me/form/images", Some(token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}
