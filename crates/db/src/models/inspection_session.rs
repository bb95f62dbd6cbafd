//! Inspection session row models.
//!
//! Stage snapshots live in JSONB columns and round-trip through the core
//! serde representation.

use kitcheck_core::error::CoreError;
use kitcheck_core::session::{Session, StageSnapshot};
use kitcheck_core::status::SessionStatus;
use kitcheck_core::store::SessionListItem;
use kitcheck_core::types::{SessionId, Timestamp, UserId};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct InspectionSessionRow {
    pub id: SessionId,
    pub owner_user_id: UserId,
    pub status: String,
    pub threshold_used: f64,
    pub notes: Option<String>,
    pub handout: Json<StageSnapshot>,
    pub handover: Json<StageSnapshot>,
    pub hash: Option<String>,
    pub issued_at: Option<Timestamp>,
    pub returned_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Listing row joined with the owner's employee id.
#[derive(Debug, Clone, FromRow)]
pub struct SessionListRow {
    pub id: SessionId,
    pub employee_id: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn parse_status(id: SessionId, raw: &str) -> Result<SessionStatus, CoreError> {
    raw.parse()
        .map_err(|e| CoreError::Internal(format!("session {id}: {e}")))
}

impl TryFrom<InspectionSessionRow> for Session {
    type Error = CoreError;

    fn try_from(row: InspectionSessionRow) -> Result<Self, Self::Error> {
        Ok(Session {
            status: parse_status(row.id, &row.status)?,
            id: row.id,
            owner_user_id: row.owner_user_id,
            threshold_used: row.threshold_used,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            issued_at: row.issued_at,
            returned_at: row.returned_at,
            handout: row.handout.0,
            handover: row.handover.0,
            hash: row.hash,
        })
    }
}

impl TryFrom<SessionListRow> for SessionListItem {
    type Error = CoreError;

    fn try_from(row: SessionListRow) -> Result<Self, Self::Error> {
        Ok(SessionListItem {
            status: parse_status(row.id, &row.status)?,
            id: row.id,
            employee_id: row.employee_id,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
