pub mod auth;
pub mod health;
pub mod predict;
pub mod sessions;

use kitcheck_core::error::CoreError;
use kitcheck_core::types::SessionId;
use kitcheck_core::workflow::DEFAULT_THRESHOLD;

/// Parse a session id path segment. Malformed ids are simply not found.
pub(crate) fn parse_session_id(raw: &str) -> Result<SessionId, CoreError> {
    raw.parse().map_err(|_| CoreError::session_not_found(raw))
}

pub(crate) fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

pub(crate) fn default_confirm() -> bool {
    true
}
