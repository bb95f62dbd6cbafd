//! Route definitions for the `/sessions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// All routes require authentication.
///
/// ```text
/// GET  /sessions                          -> list
/// POST /sessions/handout                  -> create_handout
/// GET  /sessions/{id}                     -> get_by_id
/// POST /sessions/{id}/handout/predict     -> handout_predict
/// POST /sessions/{id}/handout/adjust      -> handout_adjust
/// POST /sessions/{id}/issue               -> issue
/// POST /sessions/{id}/handover/predict    -> handover_predict
/// POST /sessions/{id}/handover/adjust     -> handover_adjust
/// POST /sessions/{id}/finalize            -> finalize
/// GET  /sessions/{id}/diff                -> diff
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(sessions::list))
        .route("/sessions/handout", post(sessions::create_handout))
        .route("/sessions/{id}", get(sessions::get_by_id))
        .route("/sessions/{id}/handout/predict", post(sessions::handout_predict))
        .route("/sessions/{id}/handout/adjust", post(sessions::handout_adjust))
        .route("/sessions/{id}/issue", post(sessions::issue))
        .route("/sessions/{id}/handover/predict", post(sessions::handover_predict))
        .route("/sessions/{id}/handover/adjust", post(sessions::handover_adjust))
        .route("/sessions/{id}/finalize", post(sessions::finalize))
        .route("/sessions/{id}/diff", get(sessions::diff))
}
