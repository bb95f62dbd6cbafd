use axum::routing::post;
use axum::Router;

use crate::handlers::predict;
use crate::state::AppState;

/// ```text
/// POST /predict        -> predict
/// POST /predict/adjust -> adjust
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict::predict))
        .route("/predict/adjust", post(predict::adjust))
}
