//! Zero-sized repositories with static async methods taking `&PgPool`.

pub mod inspection_session_repo;
pub mod user_repo;

pub use inspection_session_repo::InspectionSessionRepo;
pub use user_repo::UserRepo;
