//! Handlers for the `/sessions` resource.
//!
//! Every handler authenticates the caller and delegates to
//! [`SessionWorkflow`](kitcheck_core::workflow::SessionWorkflow); the access
//! policy and state machine live there.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kitcheck_core::access::Page;
use kitcheck_core::annotation::Annotation;
use kitcheck_core::detection::PredictionResult;
use kitcheck_core::diff::DiffResult;
use kitcheck_core::session::{Session, StageSnapshot};
use kitcheck_core::status::{SessionStatus, Stage};
use kitcheck_core::store::SessionListItem;
use kitcheck_core::types::{SessionId, Timestamp};
use serde::{Deserialize, Serialize};

use super::predict::check_annotation_count;
use super::{default_confirm, default_threshold, parse_session_id};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateHandoutRequest {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateHandoutResponse {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub threshold_used: f64,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct SessionPredictRequest {
    pub image: String,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

#[derive(Debug, Deserialize)]
pub struct SessionAdjustRequest {
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Serialize)]
pub struct SessionAdjustResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
    pub stage: Stage,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    #[serde(default = "default_confirm")]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub status: SessionStatus,
    pub issued_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct FinalizeResponse {
    pub status: SessionStatus,
    pub returned_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct SessionsListResponse {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub items: Vec<SessionListItem>,
}

/// Committed final set, wrapped as `{"annotations": [...]}`.
#[derive(Debug, Serialize)]
pub struct FinalView {
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Serialize)]
pub struct StageView {
    pub predict: Option<PredictionResult>,
    #[serde(rename = "final")]
    pub final_set: Option<FinalView>,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_at: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct SessionCardResponse {
    pub id: SessionId,
    pub employee_id: String,
    pub status: SessionStatus,
    pub threshold_used: f64,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub issued_at: Option<Timestamp>,
    pub returned_at: Option<Timestamp>,
    pub handout: Option<StageView>,
    pub handover: Option<StageView>,
    pub hash: Option<String>,
}

/// A stage is shown once anything has been recorded for it.
fn stage_view(
    snapshot: StageSnapshot,
    issued_at: Option<Timestamp>,
    returned_at: Option<Timestamp>,
) -> Option<StageView> {
    if snapshot.is_empty() && issued_at.is_none() && returned_at.is_none() {
        return None;
    }
    Some(StageView {
        predict: snapshot.predict,
        final_set: snapshot
            .final_annotations
            .map(|annotations| FinalView { annotations }),
        image: snapshot.image,
        issued_at,
        returned_at,
    })
}

impl SessionCardResponse {
    fn new(session: Session, employee_id: String) -> Self {
        Self {
            id: session.id,
            employee_id,
            status: session.status,
            threshold_used: session.threshold_used,
            notes: session.notes,
            created_at: session.created_at,
            updated_at: session.updated_at,
            issued_at: session.issued_at,
            returned_at: session.returned_at,
            handout: stage_view(session.handout, session.issued_at, None),
            handover: stage_view(session.handover, None, session.returned_at),
            hash: session.hash,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /sessions/handout
pub async fn create_handout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateHandoutRequest>,
) -> AppResult<(StatusCode, Json<CreateHandoutResponse>)> {
    let session = state
        .workflow
        .create(&user.actor(), input.threshold, input.notes)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateHandoutResponse {
            session_id: session.id,
            status: session.status,
            threshold_used: session.threshold_used,
            created_at: session.created_at,
        }),
    ))
}

async fn predict_stage(
    state: AppState,
    user: AuthUser,
    raw_id: &str,
    stage: Stage,
    input: SessionPredictRequest,
) -> AppResult<Json<PredictionResult>> {
    let id = parse_session_id(raw_id)?;
    let result = state
        .workflow
        .predict(&user.actor(), id, stage, input.image, input.threshold)
        .await?;
    Ok(Json(result))
}

async fn adjust_stage(
    state: AppState,
    user: AuthUser,
    raw_id: &str,
    stage: Stage,
    input: SessionAdjustRequest,
) -> AppResult<Json<SessionAdjustResponse>> {
    let id = parse_session_id(raw_id)?;
    check_annotation_count(&input.annotations, state.workflow.catalog())?;

    let outcome = state
        .workflow
        .adjust(&user.actor(), id, stage, input.annotations)
        .await?;
    let ok = outcome.report.is_ok();
    Ok(Json(SessionAdjustResponse {
        ok,
        issues: (!ok).then(|| outcome.report.messages()),
        stage: outcome.stage,
        count: outcome.count,
    }))
}

/// POST /sessions/{id}/handout/predict
pub async fn handout_predict(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<SessionPredictRequest>,
) -> AppResult<Json<PredictionResult>> {
    predict_stage(state, user, &id, Stage::Handout, input).await
}

/// POST /sessions/{id}/handout/adjust
pub async fn handout_adjust(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<SessionAdjustRequest>,
) -> AppResult<Json<SessionAdjustResponse>> {
    adjust_stage(state, user, &id, Stage::Handout, input).await
}

/// POST /sessions/{id}/handover/predict
pub async fn handover_predict(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<SessionPredictRequest>,
) -> AppResult<Json<PredictionResult>> {
    predict_stage(state, user, &id, Stage::Handover, input).await
}

/// POST /sessions/{id}/handover/adjust
pub async fn handover_adjust(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<SessionAdjustRequest>,
) -> AppResult<Json<SessionAdjustResponse>> {
    adjust_stage(state, user, &id, Stage::Handover, input).await
}

/// POST /sessions/{id}/issue
pub async fn issue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<ConfirmRequest>,
) -> AppResult<Json<IssueResponse>> {
    let id = parse_session_id(&id)?;
    let issued_at = state
        .workflow
        .issue(&user.actor(), id, input.confirm)
        .await?;
    Ok(Json(IssueResponse {
        status: SessionStatus::ISSUED,
        issued_at,
    }))
}

/// POST /sessions/{id}/finalize
pub async fn finalize(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<ConfirmRequest>,
) -> AppResult<Json<FinalizeResponse>> {
    let id = parse_session_id(&id)?;
    let returned_at = state
        .workflow
        .finalize(&user.actor(), id, input.confirm)
        .await?;
    Ok(Json(FinalizeResponse {
        status: SessionStatus::RETURNED,
        returned_at,
    }))
}

/// GET /sessions
///
/// Admins see every session; everyone else only their own.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PageParams>,
) -> AppResult<Json<SessionsListResponse>> {
    let page = Page::new(params.page, params.limit)?;
    let (items, total) = state.workflow.list(&user.actor(), page).await?;
    Ok(Json(SessionsListResponse {
        page: page.page,
        limit: page.limit,
        total,
        items,
    }))
}

/// GET /sessions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<SessionCardResponse>> {
    let id = parse_session_id(&id)?;
    let session = state.workflow.get(&user.actor(), id).await?;

    let employee_id = if session.owner_user_id == user.user_id {
        user.employee_id
    } else {
        state
            .users
            .find_by_id(session.owner_user_id)
            .await?
            .map(|owner| owner.employee_id)
            .unwrap_or_default()
    };

    Ok(Json(SessionCardResponse::new(session, employee_id)))
}

/// GET /sessions/{id}/diff
pub async fn diff(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<DiffResult>> {
    let id = parse_session_id(&id)?;
    let result = state.workflow.diff(&user.actor(), id).await?;
    Ok(Json(result))
}
