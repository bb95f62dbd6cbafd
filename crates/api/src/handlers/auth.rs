//! Handlers for the `/auth` resource (register, login, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use kitcheck_core::error::CoreError;
use kitcheck_core::roles::Role;
use kitcheck_core::store::NewUser;
use kitcheck_core::types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password, verify_unknown_user};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, INVALID_CREDENTIALS};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64))]
    pub employee_id: String,
    #[validate(length(min = 4, max = 72))]
    pub password: String,
    /// `simple` (default) or `admin`.
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
    pub employee_id: String,
    pub role: Role,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub employee_id: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: UserId,
    pub employee_id: String,
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    input
        .validate()
        .map_err(|e| AppError::Unprocessable(e.to_string()))?;

    let role = match input.role.as_deref() {
        Some(raw) => raw.parse::<Role>()?,
        None => Role::default(),
    };

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = state
        .users
        .create_user(NewUser {
            employee_id: input.employee_id,
            password_hash,
            role,
        })
        .await?;

    tracing::info!(user_id = %user.id, employee_id = %user.employee_id, role = %user.role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            employee_id: user.employee_id,
            role: user.role,
            created_at: user.created_at,
        }),
    ))
}

/// POST /auth/login
///
/// Unknown employee ids and wrong passwords fail identically, each after one
/// Argon2 verification.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));

    let Some(user) = state
        .users
        .find_by_employee_id(&input.employee_id)
        .await?
    else {
        verify_unknown_user(&input.password);
        tracing::info!(employee_id = %input.employee_id, "Login rejected");
        return Err(invalid());
    };

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(employee_id = %input.employee_id, "Login rejected");
        return Err(invalid());
    }

    let access_token = generate_access_token(user.id, user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.expires_seconds,
    }))
}

/// GET /auth/me
pub async fn me(user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: user.user_id,
        employee_id: user.employee_id,
        role: user.role,
    })
}
