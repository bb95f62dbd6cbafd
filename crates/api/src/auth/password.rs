//! Operator passwords, stored as Argon2id PHC strings in `users.password_hash`.
//!
//! Login pays for exactly one Argon2 verification whether or not the
//! employee id exists; see [`verify_unknown_user`].

use std::sync::LazyLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash of a password no account uses, built on first use.
static UNKNOWN_USER_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("kitcheck:no-such-employee").ok());

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Run a full verification for an employee id that has no account.
/// Always `false`.
pub fn verify_unknown_user(password: &str) -> bool {
    if let Some(hash) = UNKNOWN_USER_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("E1001-pin").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("E1001-pin", &hash).unwrap());
        assert!(!verify_password("E1001-pun", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let a = hash_password("1234").unwrap();
        let b = hash_password("1234").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_unknown_user_verifies_against_real_hash() {
        let hash = UNKNOWN_USER_HASH.as_deref().expect("dummy hash should build");
        assert!(hash.starts_with("$argon2id$"));
        assert!(!verify_unknown_user("kitcheck:no-such-employee"));
        assert!(!verify_unknown_user("anything"));
    }
}
