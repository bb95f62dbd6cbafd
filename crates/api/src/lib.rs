//! Kit Check API server library.
//!
//! Exposes config, state, error handling, routes and the HTTP detector
//! backend so integration tests and the binary share them.

pub mod auth;
pub mod config;
pub mod detector;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod router;
pub mod routes;
pub mod state;
