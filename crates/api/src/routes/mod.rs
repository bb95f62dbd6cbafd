pub mod auth;
pub mod health;
pub mod predict;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Build the full route tree. Everything is mounted at the root.
///
/// ```text
/// /healthz, /version, /ml/status              service status (public)
/// /predict, /predict/adjust                   stateless prediction (public)
///
/// /auth/register                              register (public)
/// /auth/login                                 login (public)
/// /auth/me                                    current user
///
/// /sessions                                   list
/// /sessions/handout                           create
/// /sessions/{id}                              card
/// /sessions/{id}/handout/{predict,adjust}     handout stage
/// /sessions/{id}/issue                        confirm handout
/// /sessions/{id}/handover/{predict,adjust}    handover stage
/// /sessions/{id}/finalize                     confirm return
/// /sessions/{id}/diff                         handout vs handover
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(predict::router())
        .nest("/auth", auth::router())
        .merge(sessions::router())
}
