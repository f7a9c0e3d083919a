//! Argon2id password hashing.
//!
//! Both operations are CPU-heavy; async callers should run them on the
//! blocking pool (see [`hash_password_blocking`] and [`verify_password_blocking`]).

use anyhow::Context;
use argon2::{
    password_hash::{Error as HashError, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rand::rngs::OsRng;

/// Hash a plaintext password into a PHC string with a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?
        .to_string();
    Ok(hash)
}

/// Check `candidate` against a stored PHC hash.
///
/// A mismatch is `Ok(false)`. An unparseable stored hash is an error: it means
/// the users table holds something this service never wrote.
pub fn verify_password(stored_hash: &str, candidate: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("stored password hash is malformed: {e}"))?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("password verification failed: {e}")),
    }
}

pub async fn hash_password_blocking(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("password hashing task panicked")?
}

pub async fn verify_password_blocking(
    stored_hash: String,
    candidate: String,
) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&stored_hash, &candidate))
        .await
        .context("password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "hunter22").unwrap());
    }

    #[test]
    fn wrong_password_is_false_not_error() {
        let hash = hash_password("hunter22").unwrap();
        assert!(!verify_password(&hash, "hunter23").unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("repeat-me").unwrap();
        let b = hash_password("repeat-me").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(verify_password("plaintext-in-db", "plaintext-in-db").is_err());
    }

    #[tokio::test]
    async fn blocking_wrappers_round_trip() {
        let hash = hash_password_blocking("s3cret!".into()).await.unwrap();
        assert!(verify_password_blocking(hash.clone(), "s3cret!".into()).await.unwrap());
        assert!(!verify_password_blocking(hash, "nope".into()).await.unwrap());
    }
}
