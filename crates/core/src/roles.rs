//! User roles.
//!
//! Only two roles exist. The string forms must match the `CHECK` constraint on
//! `users.role` in `20260101000001_create_users.sql`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_SIMPLE: &str = "simple";
pub const ROLE_ADMIN: &str = "admin";

/// Role chosen at registration. Never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Simple,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => ROLE_SIMPLE,
            Self::Admin => ROLE_ADMIN,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_SIMPLE => Ok(Self::Simple),
            ROLE_ADMIN => Ok(Self::Admin),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {ROLE_SIMPLE}, {ROLE_ADMIN}"
            ))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_roles() {
        assert_eq!("simple".parse::<Role>().unwrap(), Role::Simple);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn parse_unknown_role_fails() {
        let err = "reviewer".parse::<Role>().unwrap_err();
        assert!(err.to_string().contains("Invalid role"));
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"simple\"").unwrap();
        assert_eq!(role, Role::Simple);
    }

    #[test]
    fn default_is_simple() {
        assert_eq!(Role::default(), Role::Simple);
        assert!(!Role::Simple.is_admin());
        assert!(Role::Admin.is_admin());
    }
}
