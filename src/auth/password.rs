//! Password hashing.
//!
//! Argon2id with a per-hash random salt. Digests are PHC strings, so the
//! parameters a digest was produced with travel with it and verification keeps
//! working after the configured work factor changes.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;

use crate::config::HashingConfig;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid argon2 parameters: {0}")]
    InvalidParams(argon2::Error),
    #[error("password hashing failed: {0}")]
    Hashing(argon2::password_hash::Error),
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Clone)]
pub struct CredentialStore {
    params: Params,
}

impl CredentialStore {
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidParams` when the work factor is out of range.
    pub fn new(config: HashingConfig) -> Result<Self, CredentialError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(CredentialError::InvalidParams)?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(CredentialError::Hashing)?;
        Ok(digest.to_string())
    }

    /// `false` both for a wrong password and for a digest that does not parse.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Runs [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, CredentialError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.hash(&plaintext)).await?
    }

    /// Runs [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_blocking(&self, plaintext: String, digest: String) -> bool {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.verify(&plaintext, &digest))
            .await
            .unwrap_or(false)
    }
}
