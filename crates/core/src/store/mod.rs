//! Persistence seam for users and sessions.
//!
//! The workflow only talks to these traits. `kitcheck-db` provides the
//! PostgreSQL implementation; [`memory::MemoryStore`] backs tests and
//! database-less runs.

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;

use crate::access::Page;
use crate::error::CoreError;
use crate::roles::Role;
use crate::session::Session;
use crate::status::SessionStatus;
use crate::types::{SessionId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub employee_id: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub employee_id: String,
    pub password_hash: String,
    pub role: Role,
}

/// Row shape for session listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionListItem {
    pub id: SessionId,
    pub employee_id: String,
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. A taken `employee_id` is a [`CoreError::Conflict`].
    async fn create_user(&self, new: NewUser) -> Result<User, CoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, CoreError>;

    async fn find_by_employee_id(&self, employee_id: &str) -> Result<Option<User>, CoreError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a brand-new session.
    async fn create_session(&self, session: &Session) -> Result<(), CoreError>;

    async fn get_session(&self, id: SessionId) -> Result<Option<Session>, CoreError>;

    /// Newest first. `owner` of `None` lists every session.
    async fn list_sessions(
        &self,
        owner: Option<UserId>,
        page: Page,
    ) -> Result<(Vec<SessionListItem>, i64), CoreError>;

    /// Overwrite every mutable field of an existing session.
    async fn save_session(&self, session: &Session) -> Result<(), CoreError>;

    /// Short backend name for health reporting.
    fn kind(&self) -> &'static str;
}
