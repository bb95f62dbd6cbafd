//! Service health, version and model status.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    /// `postgres` or `memory`.
    pub store: &'static str,
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub name: String,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct MlStatusResponse {
    pub detector_enabled: bool,
    pub backend: String,
    /// `ready` when a model backend is configured, else `using_stub`.
    pub status: &'static str,
    pub classes: usize,
}

/// GET /healthz
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, store) = match &state.pool {
        Some(pool) => match kitcheck_db::health_check(pool).await {
            Ok(()) => ("ok", "postgres"),
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                ("degraded", "postgres")
            }
        },
        None => ("ok", "memory"),
    };
    Json(HealthResponse { status, store })
}

/// GET /version
pub async fn version(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        name: state.config.app_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /ml/status
pub async fn ml_status(State(state): State<AppState>) -> Json<MlStatusResponse> {
    let detector = state.workflow.detector();
    Json(MlStatusResponse {
        detector_enabled: state.config.detector.enabled,
        backend: detector.backend_name().to_string(),
        status: if detector.has_backend() {
            "ready"
        } else {
            "using_stub"
        },
        classes: detector.catalog().len(),
    })
}
