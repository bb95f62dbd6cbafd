//! Who may see which session.
//!
//! A session is visible to its owner and to admins. Anyone else gets the
//! same not-found error as for a session that does not exist.

use serde::Deserialize;

use crate::error::CoreError;
use crate::roles::Role;
use crate::session::Session;
use crate::types::UserId;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// The authenticated caller of a workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Whether `actor` may read or write `session`.
pub fn can_access(actor: &Actor, session: &Session) -> bool {
    actor.is_admin() || session.owner_user_id == actor.user_id
}

/// Fail with not-found unless `actor` may access `session`.
pub fn ensure_visible(actor: &Actor, session: &Session) -> Result<(), CoreError> {
    if can_access(actor, session) {
        Ok(())
    } else {
        Err(CoreError::session_not_found(session.id))
    }
}

/// Owner filter for listing: `None` means every session.
pub fn owner_filter(actor: &Actor) -> Option<UserId> {
    if actor.is_admin() {
        None
    } else {
        Some(actor.user_id)
    }
}

/// Pagination with 1-based pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Build a page, rejecting out-of-range values.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, CoreError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if page < 1 {
            return Err(CoreError::Validation("page must be >= 1".to_string()));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(CoreError::Validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        if (page - 1).checked_mul(limit).is_none() {
            return Err(CoreError::Validation("page is out of range".to_string()));
        }
        Ok(Self { page, limit })
    }

    /// Rows to skip. Cannot overflow for a page built by [`Page::new`].
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn session_of(owner: UserId) -> Session {
        Session::new(Uuid::new_v4(), owner, 0.98, None, Utc::now())
    }

    #[test]
    fn owner_and_admin_can_access() {
        let owner = Actor::new(Uuid::new_v4(), Role::Simple);
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        let s = session_of(owner.user_id);
        assert!(can_access(&owner, &s));
        assert!(can_access(&admin, &s));
    }

    #[test]
    fn stranger_gets_not_found() {
        let stranger = Actor::new(Uuid::new_v4(), Role::Simple);
        let s = session_of(Uuid::new_v4());
        assert_matches!(
            ensure_visible(&stranger, &s),
            Err(CoreError::NotFound { entity: "Session", .. })
        );
    }

    #[test]
    fn owner_filter_by_role() {
        let simple = Actor::new(Uuid::new_v4(), Role::Simple);
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        assert_eq!(owner_filter(&simple), Some(simple.user_id));
        assert_eq!(owner_filter(&admin), None);
    }

    #[test]
    fn page_defaults_and_offset() {
        let page = Page::new(None, None).unwrap();
        assert_eq!(page, Page::default());
        assert_eq!(page.offset(), 0);
        assert_eq!(Page::new(Some(3), Some(20)).unwrap().offset(), 40);
    }

    #[test]
    fn page_with_overflowing_offset_is_rejected() {
        assert_matches!(
            Page::new(Some(i64::MAX), Some(100)),
            Err(CoreError::Validation(_))
        );
        // Largest page whose offset still fits.
        let last = i64::MAX / 100 + 1;
        assert_eq!(Page::new(Some(last), Some(100)).unwrap().offset(), (last - 1) * 100);
    }

    #[test]
    fn page_bounds() {
        assert!(Page::new(Some(0), None).is_err());
        assert!(Page::new(None, Some(0)).is_err());
        assert!(Page::new(None, Some(101)).is_err());
        assert!(Page::new(None, Some(100)).is_ok());
    }
}
