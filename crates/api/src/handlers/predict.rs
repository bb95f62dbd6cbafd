//! Stateless prediction and annotation check, outside any session.

use axum::extract::State;
use axum::Json;
use kitcheck_core::annotation::{validate_final_annotations, Annotation};
use kitcheck_core::catalog::Catalog;
use kitcheck_core::detection::PredictionResult;
use serde::{Deserialize, Serialize};

use super::default_threshold;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Base64 image, optionally a `data:` URL.
    pub image: String,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Serialize)]
pub struct AdjustResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
}

/// Reject annotation sets whose size cannot possibly match the catalog.
pub(crate) fn check_annotation_count(
    annotations: &[Annotation],
    catalog: &Catalog,
) -> AppResult<()> {
    if annotations.len() != catalog.len() {
        return Err(AppError::Unprocessable(format!(
            "annotations must contain exactly {} items, got {}",
            catalog.len(),
            annotations.len()
        )));
    }
    Ok(())
}

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    Json(input): Json<PredictRequest>,
) -> AppResult<Json<PredictionResult>> {
    let result = state.workflow.preview(&input.image, input.threshold).await?;
    Ok(Json(result))
}

/// POST /predict/adjust
pub async fn adjust(
    State(state): State<AppState>,
    Json(input): Json<AdjustRequest>,
) -> AppResult<Json<AdjustResponse>> {
    let catalog = state.workflow.catalog();
    check_annotation_count(&input.annotations, catalog)?;

    let report = validate_final_annotations(&input.annotations, catalog);
    let response = if report.is_ok() {
        AdjustResponse {
            ok: true,
            message: Some("Final annotations accepted"),
            count: Some(input.annotations.len()),
            issues: None,
        }
    } else {
        AdjustResponse {
            ok: false,
            message: None,
            count: None,
            issues: Some(report.messages()),
        }
    };
    Ok(Json(response))
}
