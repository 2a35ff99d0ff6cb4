use std::sync::Arc;

use intake_core::clock::Clock;

use crate::config::ServerConfig;
use crate::identity::IdentityProvider;
use crate::storage::BlobStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: intake_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Where uploaded images live.
    pub blobs: Arc<dyn BlobStore>,
    /// Admin API of the external identity service.
    pub identity: Arc<dyn IdentityProvider>,
    /// Time source for activity stamps and the inactivity window.
    pub clock: Arc<dyn Clock>,
}
