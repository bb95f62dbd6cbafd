//! JWT access-token generation and validation.
//!
//! Access tokens are HS256-signed JWTs containing a [`Claims`] payload.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use kitcheck_core::roles::Role;
use kitcheck_core::types::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Secret used when `JWT_SECRET` is unset. Startup logs a warning.
pub const DEFAULT_SECRET: &str = "change-me-in-prod";

/// Default access token lifetime (8 hours).
const DEFAULT_EXPIRES_SECONDS: i64 = 28_800;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's id.
    pub sub: UserId,
    pub role: Role,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier.
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in seconds.
    pub expires_seconds: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var               | Default             |
    /// |-----------------------|---------------------|
    /// | `JWT_SECRET`          | `change-me-in-prod` |
    /// | `JWT_EXPIRES_SECONDS` | `28800`             |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_EXPIRES_SECONDS` is not a positive integer.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SECRET.to_string());

        let expires_seconds: i64 = std::env::var("JWT_EXPIRES_SECONDS")
            .unwrap_or_else(|_| DEFAULT_EXPIRES_SECONDS.to_string())
            .parse()
            .expect("JWT_EXPIRES_SECONDS must be a valid i64");
        assert!(expires_seconds > 0, "JWT_EXPIRES_SECONDS must be positive");

        Self {
            secret,
            expires_seconds,
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

/// Generate an HS256 access token for the given user.
pub fn generate_access_token(
    user_id: UserId,
    role: Role,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user_id,
        role,
        exp: now + config.expires_seconds,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Validates the signature and expiration.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}
