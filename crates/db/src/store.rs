//! [`PgStore`]: the PostgreSQL implementation of the core store traits.

use async_trait::async_trait;
use kitcheck_core::access::Page;
use kitcheck_core::error::CoreError;
use kitcheck_core::session::Session;
use kitcheck_core::store::{NewUser, SessionListItem, SessionStore, User, UserStore};
use kitcheck_core::types::{SessionId, UserId};

use crate::models::user::CreateUser;
use crate::repositories::{InspectionSessionRepo, UserRepo};
use crate::DbPool;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map a sqlx error into the domain error.
///
/// Unique violations become [`CoreError::Conflict`]; everything else is
/// logged and reported as a sanitized internal error.
fn db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        // PostgreSQL unique constraint violation: error code 23505
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {constraint}"
            ));
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal("database operation failed".to_string())
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new: NewUser) -> Result<User, CoreError> {
        let input = CreateUser {
            employee_id: &new.employee_id,
            password_hash: &new.password_hash,
            role: new.role,
        };
        let row = UserRepo::create(&self.pool, &input).await.map_err(|e| {
            match db_error(e) {
                CoreError::Conflict(_) => CoreError::Conflict(format!(
                    "employee_id '{}' is already registered",
                    new.employee_id
                )),
                other => other,
            }
        })?;
        row.try_into()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, CoreError> {
        UserRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_employee_id(&self, employee_id: &str) -> Result<Option<User>, CoreError> {
        UserRepo::find_by_employee_id(&self.pool, employee_id)
            .await
            .map_err(db_error)?
            .map(User::try_from)
            .transpose()
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create_session(&self, session: &Session) -> Result<(), CoreError> {
        InspectionSessionRepo::create(&self.pool, session)
            .await
            .map_err(db_error)
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<Session>, CoreError> {
        InspectionSessionRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error)?
            .map(Session::try_from)
            .transpose()
    }

    async fn list_sessions(
        &self,
        owner: Option<UserId>,
        page: Page,
    ) -> Result<(Vec<SessionListItem>, i64), CoreError> {
        let (rows, total) =
            InspectionSessionRepo::list(&self.pool, owner, page.limit, page.offset())
                .await
                .map_err(db_error)?;
        let items = rows
            .into_iter()
            .map(SessionListItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    async fn save_session(&self, session: &Session) -> Result<(), CoreError> {
        let updated = InspectionSessionRepo::update(&self.pool, session)
            .await
            .map_err(db_error)?;
        if updated {
            Ok(())
        } else {
            Err(CoreError::session_not_found(session.id))
        }
    }

    fn kind(&self) -> &'static str {
        "postgres"
    }
}
