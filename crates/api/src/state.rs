use std::sync::Arc;

use kitcheck_core::detector::DetectorAdapter;
use kitcheck_core::store::{SessionStore, UserStore};
use kitcheck_core::workflow::SessionWorkflow;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind `Arc` or is itself `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub users: Arc<dyn UserStore>,
    pub workflow: SessionWorkflow,
    /// Present when running against PostgreSQL; used by the health check.
    pub pool: Option<kitcheck_db::DbPool>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        detector: DetectorAdapter,
        pool: Option<kitcheck_db::DbPool>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            users,
            workflow: SessionWorkflow::new(sessions, Arc::new(detector)),
            pool,
        }
    }
}
