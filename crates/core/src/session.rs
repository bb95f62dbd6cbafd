//! The session aggregate and its state machine.
//!
//! Every mutation goes through one of the transition methods below. Each one
//! checks its guard before touching anything, so a rejected call leaves the
//! session exactly as it was.
//!
//! ```text
//! draft ──predict──▶ handout_auto / handout_needs_manual ──adjust/issue──▶ issued
//! issued ──predict──▶ handover_auto / handover_needs_manual ──adjust/finalize──▶ returned
//! ```

use serde::{Deserialize, Serialize};

use crate::annotation::{validate_final_annotations, Annotation, ValidationReport};
use crate::catalog::Catalog;
use crate::detection::PredictionResult;
use crate::diff::{diff, DiffResult};
use crate::error::CoreError;
use crate::hashing::finals_digest;
use crate::status::{SessionStatus, Stage};
use crate::types::{SessionId, Timestamp, UserId};

/// Everything recorded for one stage of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageSnapshot {
    pub predict: Option<PredictionResult>,
    #[serde(rename = "final")]
    pub final_annotations: Option<Vec<Annotation>>,
    /// Submitted image, base64 as received.
    pub image: Option<String>,
}

impl StageSnapshot {
    pub fn is_empty(&self) -> bool {
        self.predict.is_none() && self.final_annotations.is_none() && self.image.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub owner_user_id: UserId,
    pub status: SessionStatus,
    pub threshold_used: f64,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub issued_at: Option<Timestamp>,
    pub returned_at: Option<Timestamp>,
    pub handout: StageSnapshot,
    pub handover: StageSnapshot,
    /// `sha256:<hex>` over both finals, sealed on return.
    pub hash: Option<String>,
}

impl Session {
    /// A fresh session in `draft`.
    pub fn new(
        id: SessionId,
        owner_user_id: UserId,
        threshold_used: f64,
        notes: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            owner_user_id,
            status: SessionStatus::DRAFT,
            threshold_used,
            notes,
            created_at: now,
            updated_at: now,
            issued_at: None,
            returned_at: None,
            handout: StageSnapshot::default(),
            handover: StageSnapshot::default(),
            hash: None,
        }
    }

    pub fn snapshot(&self, stage: Stage) -> &StageSnapshot {
        match stage {
            Stage::Handout => &self.handout,
            Stage::Handover => &self.handover,
        }
    }

    fn snapshot_mut(&mut self, stage: Stage) -> &mut StageSnapshot {
        match stage {
            Stage::Handout => &mut self.handout,
            Stage::Handover => &mut self.handover,
        }
    }

    fn rejected(&self, operation: &str) -> CoreError {
        CoreError::InvalidState(format!(
            "{operation} is not allowed while the session is '{}'",
            self.status
        ))
    }

    // -----------------------------------------------------------------------
    // Guards
    // -----------------------------------------------------------------------

    pub fn can_predict(&self, stage: Stage) -> bool {
        match stage {
            Stage::Handout => {
                self.status == SessionStatus::DRAFT || self.status.is_awaiting_final(Stage::Handout)
            }
            Stage::Handover => {
                self.status == SessionStatus::ISSUED
                    || self.status.is_awaiting_final(Stage::Handover)
            }
        }
    }

    /// Adjust is only accepted while the stage is awaiting its final set.
    /// Once issued or returned, finals are frozen.
    pub fn can_adjust(&self, stage: Stage) -> bool {
        self.status.is_awaiting_final(stage)
    }

    pub fn can_issue(&self) -> bool {
        self.status.stage() == Stage::Handout
            && (self.status == SessionStatus::HANDOUT_AUTO
                || self.handout.final_annotations.is_some())
    }

    pub fn can_finalize(&self) -> bool {
        self.status.is_awaiting_final(Stage::Handover)
            || (self.status == SessionStatus::RETURNED
                && self.handover.final_annotations.is_some())
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Store a prediction for `stage` and move to its auto/needs-manual status.
    pub fn record_prediction(
        &mut self,
        stage: Stage,
        prediction: PredictionResult,
        image: String,
        now: Timestamp,
    ) -> Result<SessionStatus, CoreError> {
        if !self.can_predict(stage) {
            return Err(self.rejected(&format!("{stage} predict")));
        }

        let next = SessionStatus::predicted(stage, prediction.requires_manual_review());
        let snapshot = self.snapshot_mut(stage);
        snapshot.predict = Some(prediction);
        snapshot.image = Some(image);
        self.status = next;
        self.updated_at = now;
        Ok(next)
    }

    /// Validate and commit the final annotation set for `stage`.
    ///
    /// Returns `Err` only when the guard fails. A set that does not pass
    /// validation comes back as a failed report and nothing is stored.
    pub fn submit_final(
        &mut self,
        stage: Stage,
        annotations: Vec<Annotation>,
        catalog: &Catalog,
        now: Timestamp,
    ) -> Result<ValidationReport, CoreError> {
        if !self.can_adjust(stage) {
            return Err(self.rejected(&format!("{stage} adjust")));
        }

        let report = validate_final_annotations(&annotations, catalog);
        if !report.is_ok() {
            return Ok(report);
        }

        self.snapshot_mut(stage).final_annotations = Some(annotations);
        self.status = SessionStatus::closed(stage);
        self.updated_at = now;
        if stage == Stage::Handover {
            self.returned_at.get_or_insert(now);
            self.seal();
        }
        Ok(report)
    }

    /// Confirm the handout. Returns the issue timestamp.
    ///
    /// Re-issuing an issued session is a no-op that keeps the first timestamp.
    pub fn issue(&mut self, confirm: bool, now: Timestamp) -> Result<Timestamp, CoreError> {
        if !self.can_issue() {
            return Err(self.rejected("issue"));
        }
        if !confirm {
            return Err(CoreError::InvalidState(
                "issue must be confirmed".to_string(),
            ));
        }

        self.status = SessionStatus::ISSUED;
        let issued_at = *self.issued_at.get_or_insert(now);
        self.updated_at = now;
        Ok(issued_at)
    }

    /// Confirm the return. Returns the return timestamp.
    pub fn finalize(&mut self, confirm: bool, now: Timestamp) -> Result<Timestamp, CoreError> {
        if !self.can_finalize() {
            return Err(self.rejected("finalize"));
        }
        if !confirm {
            return Err(CoreError::InvalidState(
                "finalize must be confirmed".to_string(),
            ));
        }

        self.status = SessionStatus::RETURNED;
        let returned_at = *self.returned_at.get_or_insert(now);
        self.updated_at = now;
        self.seal();
        Ok(returned_at)
    }

    // -----------------------------------------------------------------------
    // Read-only
    // -----------------------------------------------------------------------

    /// Compare the committed handout and handover finals.
    pub fn diff(&self, catalog: &Catalog) -> Result<DiffResult, CoreError> {
        match (
            &self.handout.final_annotations,
            &self.handover.final_annotations,
        ) {
            (Some(handout), Some(handover)) => Ok(diff(handout, handover, catalog)),
            _ => Err(CoreError::InvalidState(
                "Both handout and handover final annotations are required".to_string(),
            )),
        }
    }

    /// Integrity digest over both finals.
    pub fn integrity_hash(&self) -> String {
        finals_digest(
            self.handout.final_annotations.as_deref(),
            self.handover.final_annotations.as_deref(),
        )
    }

    fn seal(&mut self) {
        self.hash = Some(self.integrity_hash());
    }
}
