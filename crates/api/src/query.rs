//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Page-based pagination (`?page=&limit=`). Bounds are checked by
/// [`kitcheck_core::access::Page::new`].
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
