//! Kit Check domain core.
//!
//! Everything that decides whether a tool kit is accounted for lives here:
//! the catalog, the reconciliation engine ([`detection`], [`annotation`]),
//! the session state machine ([`session`], [`status`]), the handout/handover
//! [`diff`], the [`access`] policy and the [`detector`] adapter. The
//! [`workflow`] module composes them on top of the [`store`] seam so the HTTP
//! layer only translates requests.

pub mod access;
pub mod annotation;
pub mod catalog;
pub mod detection;
pub mod detector;
pub mod diff;
pub mod error;
pub mod hashing;
pub mod roles;
pub mod session;
pub mod status;
pub mod store;
pub mod types;
pub mod workflow;
