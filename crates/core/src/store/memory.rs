//! In-process store used by tests and when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewUser, SessionListItem, SessionStore, User, UserStore};
use crate::access::Page;
use crate::error::CoreError;
use crate::session::Session;
use crate::types::{SessionId, UserId};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User, CoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.employee_id == new.employee_id) {
            return Err(CoreError::Conflict(format!(
                "employee_id '{}' is already registered",
                new.employee_id
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            employee_id: new.employee_id,
            password_hash: new.password_hash,
            role: new.role,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, CoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_employee_id(&self, employee_id: &str) -> Result<Option<User>, CoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.employee_id == employee_id)
            .cloned())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, session: &Session) -> Result<(), CoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(CoreError::Conflict(format!(
                "session {} already exists",
                session.id
            )));
        }
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<Session>, CoreError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn list_sessions(
        &self,
        owner: Option<UserId>,
        page: Page,
    ) -> Result<(Vec<SessionListItem>, i64), CoreError> {
        let sessions = self.sessions.read().await;
        let users = self.users.read().await;

        let mut visible: Vec<&Session> = sessions
            .values()
            .filter(|s| owner.map_or(true, |o| s.owner_user_id == o))
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = visible.len() as i64;
        let items = visible
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .map(|s| SessionListItem {
                id: s.id,
                employee_id: users
                    .get(&s.owner_user_id)
                    .map(|u| u.employee_id.clone())
                    .unwrap_or_default(),
                status: s.status,
                notes: s.notes.clone(),
                created_at: s.created_at,
                updated_at: s.updated_at,
            })
            .collect();

        Ok((items, total))
    }

    async fn save_session(&self, session: &Session) -> Result<(), CoreError> {
        match self.sessions.write().await.get_mut(&session.id) {
            Some(existing) => {
                *existing = session.clone();
                Ok(())
            }
            None => Err(CoreError::session_not_found(session.id)),
        }
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
