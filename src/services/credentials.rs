//! Password hashing and verification built on Argon2id.

use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::config::SecurityConfig;

pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 parameters: {}", e))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    Ok(password_hash.to_string())
}

/// Check a password against a stored PHC hash. The hash string carries its
/// own parameters, so cost settings may change without invalidating old
/// hashes. A digest that does not parse counts as a mismatch, not an error,
/// so a corrupted row degrades to a failed login instead of a 500.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        return Ok(false);
    };

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Hash on a blocking thread. Argon2 at production cost takes tens of
/// milliseconds and must not stall an async worker.
pub async fn hash(password: String, config: SecurityConfig) -> Result<String> {
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

pub async fn verify(password: String, password_hash: String) -> Result<bool> {
    task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .context("Password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("hunter42", &test_config()).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "hunter42");
        assert!(verify_password("hunter42", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hash = hash_password("hunter42", &test_config()).unwrap();

        assert!(!verify_password("hunter43", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let config = test_config();
        let first = hash_password("hunter42", &config).unwrap();
        let second = hash_password("hunter42", &config).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_treats_malformed_hash_as_mismatch() {
        assert!(!verify_password("hunter42", "not-a-phc-string").unwrap());
        assert!(!verify_password("hunter42", "").unwrap());
    }
}
