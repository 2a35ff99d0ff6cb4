use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the JWT
/// secret. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Seconds to wait for background jobs after the listener closes.
    pub shutdown_timeout_secs: u64,
    /// Bearer token verification settings.
    pub jwt: JwtConfig,
    /// Root directory of the local blob store.
    pub storage_root: PathBuf,
    /// Base URL under which stored blobs are publicly reachable.
    pub public_base_url: String,
    /// Base URL of the external identity service.
    pub identity_url: String,
    /// Service key sent to the identity service admin API.
    pub identity_service_key: String,
    /// Period of the inactivity scan.
    pub inactivity_scan_interval_secs: u64,
    /// Period of the image-completeness poll.
    pub image_sync_interval_secs: u64,
    /// Largest accepted image upload.
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                          |
    /// |----------------------------------|----------------------------------|
    /// | `HOST`                           | `0.0.0.0`                        |
    /// | `PORT`                           | `3000`                           |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173`          |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                             |
    /// | `SHUTDOWN_TIMEOUT_SECS`          | `30`                             |
    /// | `STORAGE_ROOT`                   | `storage`                        |
    /// | `PUBLIC_BASE_URL`                | `http://localhost:3000/files`    |
    /// | `IDENTITY_URL`                   | `http://localhost:9999`          |
    /// | `IDENTITY_SERVICE_KEY`           | empty                            |
    /// | `INACTIVITY_SCAN_INTERVAL_SECS`  | `3600`                           |
    /// | `IMAGE_SYNC_INTERVAL_SECS`       | `60`                             |
    /// | `MAX_UPLOAD_BYTES`               | `10485760`                       |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_env("PORT", "3000");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", "30");
        let shutdown_timeout_secs: u64 = parse_env("SHUTDOWN_TIMEOUT_SECS", "30");

        let storage_root =
            PathBuf::from(std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "storage".into()));
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/files".into())
            .trim_end_matches('/')
            .to_string();

        let identity_url = std::env::var("IDENTITY_URL")
            .unwrap_or_else(|_| "http://localhost:9999".into())
            .trim_end_matches('/')
            .to_string();
        let identity_service_key = std::env::var("IDENTITY_SERVICE_KEY").unwrap_or_default();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            storage_root,
            public_base_url,
            identity_url,
            identity_service_key,
            inactivity_scan_interval_secs: parse_env("INACTIVITY_SCAN_INTERVAL_SECS", "3600"),
            image_sync_interval_secs: parse_env("IMAGE_SYNC_INTERVAL_SECS", "60"),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", "10485760"),
        }
    }
}

/// Read and parse an env var, falling back to `default`.
///
/// # Panics
///
/// Panics if the value does not parse. Misconfiguration fails at startup.
fn parse_env<T: FromStr>(name: &str, default: &str) -> T {
    std::env::var(name)
        .unwrap_or_else(|_| default.into())
        .parse()
        .unwrap_or_else(|_| panic!("{name} must be a valid {}", std::any::type_name::<T>()))
}
