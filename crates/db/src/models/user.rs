//! User row model.

use kitcheck_core::error::CoreError;
use kitcheck_core::roles::Role;
use kitcheck_core::store::User;
use kitcheck_core::types::{Timestamp, UserId};
use sqlx::FromRow;

/// Full row from the `users` table.
///
/// Contains the password hash. Never serialize it into a response.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: UserId,
    pub employee_id: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a user.
#[derive(Debug)]
pub struct CreateUser<'a> {
    pub employee_id: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

impl TryFrom<UserRow> for User {
    type Error = CoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| CoreError::Internal(format!("user {}: {e}", row.id)))?;
        Ok(User {
            id: row.id,
            employee_id: row.employee_id,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}
