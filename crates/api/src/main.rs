use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use intake_api::background::image_sync::ImageSync;
use intake_api::background::inactivity_scan;
use intake_api::config::ServerConfig;
use intake_api::identity::HttpIdentityProvider;
use intake_api::router::build_app_router;
use intake_api::state::AppState;
use intake_api::storage::LocalBlobStore;
use intake_core::clock::{Clock, SystemClock};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intake_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = intake_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    intake_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    intake_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Collaborators ---
    let blobs = Arc::new(LocalBlobStore::new(
        config.storage_root.clone(),
        config.public_base_url.clone(),
    ));
    tracing::info!(root = %config.storage_root.display(), "Blob store ready");

    let identity = Arc::new(HttpIdentityProvider::new(
        config.identity_url.clone(),
        config.identity_service_key.clone(),
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // --- Background jobs ---
    let cancel = CancellationToken::new();

    let scan_handle = tokio::spawn(inactivity_scan::run(
        pool.clone(),
        Arc::clone(&clock),
        Duration::from_secs(config.inactivity_scan_interval_secs),
        cancel.clone(),
    ));
    let sync_handle = tokio::spawn(ImageSync::new().run(
        pool.clone(),
        Duration::from_secs(config.image_sync_interval_secs),
        cancel.clone(),
    ));
    tracing::info!("Background jobs started (inactivity scan, image sync)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        blobs,
        identity,
        clock,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(grace, scan_handle).await.is_err() {
        tracing::warn!("Inactivity scan did not stop in time");
    }
    if tokio::time::timeout(grace, sync_handle).await.is_err() {
        tracing::warn!("Image sync did not stop in time");
    }
    tracing::info!("Background jobs stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
