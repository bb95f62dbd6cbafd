pub mod inspection_session;
pub mod user;
