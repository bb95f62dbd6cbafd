//! Repository for the `inspection_sessions` table.

use kitcheck_core::session::Session;
use kitcheck_core::types::{SessionId, UserId};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::inspection_session::{InspectionSessionRow, SessionListRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_user_id, status, threshold_used, notes, handout, handover, \
                       hash, issued_at, returned_at, created_at, updated_at";

pub struct InspectionSessionRepo;

impl InspectionSessionRepo {
    /// Insert a session built by the domain layer.
    pub async fn create(pool: &PgPool, session: &Session) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO inspection_sessions
                (id, owner_user_id, status, threshold_used, notes, handout, handover,
                 hash, issued_at, returned_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(session.id)
        .bind(session.owner_user_id)
        .bind(session.status.as_str())
        .bind(session.threshold_used)
        .bind(&session.notes)
        .bind(Json(&session.handout))
        .bind(Json(&session.handover))
        .bind(&session.hash)
        .bind(session.issued_at)
        .bind(session.returned_at)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: SessionId,
    ) -> Result<Option<InspectionSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM inspection_sessions WHERE id = $1");
        sqlx::query_as::<_, InspectionSessionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of sessions, newest first, with the total matching count.
    ///
    /// `owner` of `None` lists every session.
    pub async fn list(
        pool: &PgPool,
        owner: Option<UserId>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<SessionListRow>, i64), sqlx::Error> {
        let items = sqlx::query_as::<_, SessionListRow>(
            "SELECT s.id, u.employee_id, s.status, s.notes, s.created_at, s.updated_at
             FROM inspection_sessions s
             JOIN users u ON u.id = s.owner_user_id
             WHERE ($1::uuid IS NULL OR s.owner_user_id = $1)
             ORDER BY s.created_at DESC, s.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(owner)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM inspection_sessions
             WHERE ($1::uuid IS NULL OR owner_user_id = $1)",
        )
        .bind(owner)
        .fetch_one(pool)
        .await?;

        Ok((items, total))
    }

    /// Overwrite the mutable fields. Returns `false` if no row matched.
    pub async fn update(pool: &PgPool, session: &Session) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE inspection_sessions SET
                status = $2,
                notes = $3,
                handout = $4,
                handover = $5,
                hash = $6,
                issued_at = $7,
                returned_at = $8,
                updated_at = $9
             WHERE id = $1",
        )
        .bind(session.id)
        .bind(session.status.as_str())
        .bind(&session.notes)
        .bind(Json(&session.handout))
        .bind(Json(&session.handover))
        .bind(&session.hash)
        .bind(session.issued_at)
        .bind(session.returned_at)
        .bind(session.updated_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
