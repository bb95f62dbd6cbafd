//! Repository for the `users` table.

use kitcheck_core::types::UserId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{CreateUser, UserRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, employee_id, password_hash, role, created_at";

pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// A taken `employee_id` fails with a unique violation on
    /// `uq_users_employee_id`.
    pub async fn create(pool: &PgPool, input: &CreateUser<'_>) -> Result<UserRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, employee_id, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(Uuid::now_v7())
            .bind(input.employee_id)
            .bind(input.password_hash)
            .bind(input.role.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: UserId) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by employee id (case-sensitive).
    pub async fn find_by_employee_id(
        pool: &PgPool,
        employee_id: &str,
    ) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE employee_id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(employee_id)
            .fetch_optional(pool)
            .await
    }
}
