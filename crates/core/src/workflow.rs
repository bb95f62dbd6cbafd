//! Session workflow: the operations the HTTP layer exposes, expressed over
//! the store and detector seams.
//!
//! Every mutating operation loads the session, checks visibility, applies
//! one transition on the aggregate and saves it. A rejected transition is
//! never saved.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::access::{ensure_visible, owner_filter, Actor, Page};
use crate::annotation::{Annotation, ValidationReport};
use crate::catalog::Catalog;
use crate::detection::{predict, PredictionResult};
use crate::detector::DetectorAdapter;
use crate::diff::DiffResult;
use crate::error::CoreError;
use crate::session::Session;
use crate::status::{SessionStatus, Stage};
use crate::store::{SessionListItem, SessionStore};
use crate::types::{SessionId, Timestamp};

pub const DEFAULT_THRESHOLD: f64 = 0.98;

/// Reject thresholds outside `[0, 1]` (NaN included).
pub fn validate_threshold(threshold: f64) -> Result<(), CoreError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "threshold must be within [0, 1], got {threshold}"
        )))
    }
}

/// Result of submitting a final annotation set to a session.
#[derive(Debug, Clone)]
pub struct AdjustOutcome {
    pub report: ValidationReport,
    pub stage: Stage,
    pub count: usize,
    pub status: SessionStatus,
}

#[derive(Clone)]
pub struct SessionWorkflow {
    sessions: Arc<dyn SessionStore>,
    detector: Arc<DetectorAdapter>,
}

impl SessionWorkflow {
    pub fn new(sessions: Arc<dyn SessionStore>, detector: Arc<DetectorAdapter>) -> Self {
        Self { sessions, detector }
    }

    pub fn catalog(&self) -> &Catalog {
        self.detector.catalog()
    }

    pub fn detector(&self) -> &DetectorAdapter {
        &self.detector
    }

    /// Detect and reconcile without touching any session.
    ///
    /// The model is queried at the base confidence so the response also
    /// lists the weak candidates below `threshold`.
    pub async fn preview(&self, image: &str, threshold: f64) -> Result<PredictionResult, CoreError> {
        validate_threshold(threshold)?;
        self.detect(image, threshold, self.detector.base_confidence())
            .await
    }

    async fn detect(
        &self,
        image: &str,
        threshold: f64,
        confidence: f64,
    ) -> Result<PredictionResult, CoreError> {
        let (catalog, candidates) = self.detector.infer(image, confidence).await;
        Ok(predict(&candidates, &catalog, threshold))
    }

    pub async fn create(
        &self,
        actor: &Actor,
        threshold: f64,
        notes: Option<String>,
    ) -> Result<Session, CoreError> {
        validate_threshold(threshold)?;
        let session = Session::new(Uuid::now_v7(), actor.user_id, threshold, notes, Utc::now());
        self.sessions.create_session(&session).await?;

        tracing::info!(
            session_id = %session.id,
            user_id = %actor.user_id,
            threshold,
            "Session created",
        );
        Ok(session)
    }

    /// Load a session the actor may see.
    pub async fn get(&self, actor: &Actor, id: SessionId) -> Result<Session, CoreError> {
        let session = self
            .sessions
            .get_session(id)
            .await?
            .ok_or_else(|| CoreError::session_not_found(id))?;
        ensure_visible(actor, &session)?;
        Ok(session)
    }

    pub async fn list(
        &self,
        actor: &Actor,
        page: Page,
    ) -> Result<(Vec<SessionListItem>, i64), CoreError> {
        self.sessions.list_sessions(owner_filter(actor), page).await
    }

    pub async fn predict(
        &self,
        actor: &Actor,
        id: SessionId,
        stage: Stage,
        image: String,
        threshold: f64,
    ) -> Result<PredictionResult, CoreError> {
        validate_threshold(threshold)?;
        let mut session = self.get(actor, id).await?;
        // Fail before paying for inference.
        if !session.can_predict(stage) {
            return Err(CoreError::InvalidState(format!(
                "{stage} predict is not allowed while the session is '{}'",
                session.status
            )));
        }

        // Session predictions ask the model for the threshold itself.
        let prediction = self.detect(&image, threshold, threshold).await?;
        let status = session.record_prediction(stage, prediction.clone(), image, Utc::now())?;
        self.sessions.save_session(&session).await?;

        tracing::info!(
            session_id = %id,
            user_id = %actor.user_id,
            stage = %stage,
            status = %status,
            found = prediction.summary.found_candidates,
            passed = prediction.summary.passed_above_threshold,
            "Prediction recorded",
        );
        Ok(prediction)
    }

    pub async fn adjust(
        &self,
        actor: &Actor,
        id: SessionId,
        stage: Stage,
        annotations: Vec<Annotation>,
    ) -> Result<AdjustOutcome, CoreError> {
        let mut session = self.get(actor, id).await?;
        let count = annotations.len();
        let report = session.submit_final(stage, annotations, self.catalog(), Utc::now())?;

        if report.is_ok() {
            self.sessions.save_session(&session).await?;
            tracing::info!(
                session_id = %id,
                user_id = %actor.user_id,
                stage = %stage,
                status = %session.status,
                "Final annotations committed",
            );
        } else {
            tracing::debug!(
                session_id = %id,
                stage = %stage,
                issues = report.issues.len(),
                "Final annotations rejected",
            );
        }

        Ok(AdjustOutcome {
            report,
            stage,
            count,
            status: session.status,
        })
    }

    pub async fn issue(
        &self,
        actor: &Actor,
        id: SessionId,
        confirm: bool,
    ) -> Result<Timestamp, CoreError> {
        let mut session = self.get(actor, id).await?;
        let issued_at = session.issue(confirm, Utc::now())?;
        self.sessions.save_session(&session).await?;

        tracing::info!(session_id = %id, user_id = %actor.user_id, "Kit issued");
        Ok(issued_at)
    }

    pub async fn finalize(
        &self,
        actor: &Actor,
        id: SessionId,
        confirm: bool,
    ) -> Result<Timestamp, CoreError> {
        let mut session = self.get(actor, id).await?;
        let returned_at = session.finalize(confirm, Utc::now())?;
        self.sessions.save_session(&session).await?;

        tracing::info!(session_id = %id, user_id = %actor.user_id, "Kit returned");
        Ok(returned_at)
    }

    pub async fn diff(&self, actor: &Actor, id: SessionId) -> Result<DiffResult, CoreError> {
        let session = self.get(actor, id).await?;
        session.diff(self.catalog())
    }
}
