use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use kitcheck_core::catalog::Catalog;
use kitcheck_core::detector::{Detector, DetectorAdapter};
use kitcheck_core::store::memory::MemoryStore;
use kitcheck_core::store::{SessionStore, UserStore};
use kitcheck_db::PgStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kitcheck_api::config::{LogFormat, ServerConfig};
use kitcheck_api::detector::HttpDetector;
use kitcheck_api::router::build_app_router;
use kitcheck_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Tracing ---
    let json = config.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kitcheck_api=debug,kitcheck_core=info,tower_http=info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!(
        app = %config.app_name,
        host = %config.host,
        port = %config.port,
        "Loaded server configuration",
    );
    if config.jwt.uses_default_secret() {
        tracing::warn!("JWT_SECRET is not set; using the development default");
    }

    // --- Catalog + detector ---
    let catalog = Catalog::new(config.classes.iter().cloned())
        .unwrap_or_else(|e| panic!("Invalid CLASSES: {e}"));
    tracing::info!(classes = catalog.len(), "Tool catalog loaded");

    let backend: Option<Arc<dyn Detector>> = match (&config.detector.endpoint, config.detector.enabled) {
        (Some(endpoint), true) => {
            let http = HttpDetector::new(
                endpoint.clone(),
                catalog.clone(),
                Duration::from_secs(config.detector.timeout_secs),
            )
            .expect("Failed to build detector HTTP client");
            tracing::info!(%endpoint, "Detector backend configured");
            let http: Arc<dyn Detector> = Arc::new(http);
            Some(http)
        }
        _ => {
            tracing::warn!(
                enabled = config.detector.enabled,
                "No detector backend, predictions use stub output",
            );
            None
        }
    };
    let detector = DetectorAdapter::new(
        backend,
        catalog,
        Duration::from_secs(config.detector.timeout_secs),
        config.detector.confidence,
    );

    // --- Store ---
    let (users, sessions, pool): (Arc<dyn UserStore>, Arc<dyn SessionStore>, _) =
        match &config.database_url {
            Some(database_url) => {
                let pool = kitcheck_db::create_pool(database_url)
                    .await
                    .expect("Failed to connect to database");
                tracing::info!("Database connection pool created");

                kitcheck_db::health_check(&pool)
                    .await
                    .expect("Database health check failed");

                kitcheck_db::run_migrations(&pool)
                    .await
                    .expect("Failed to run database migrations");
                tracing::info!("Database migrations applied");

                let store = Arc::new(PgStore::new(pool.clone()));
                let users: Arc<dyn UserStore> = store.clone();
                let sessions: Arc<dyn SessionStore> = store;
                (users, sessions, Some(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL is not set; sessions are kept in memory only");
                let store = Arc::new(MemoryStore::new());
                let users: Arc<dyn UserStore> = store.clone();
                let sessions: Arc<dyn SessionStore> = store;
                (users, sessions, None)
            }
        };

    // --- App state + router ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let state = AppState::new(config, users, sessions, detector, pool.clone());
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
