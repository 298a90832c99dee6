//! Password hashing with Argon2id.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use thiserror::Error;
use tokio::task;

use crate::config::SecurityConfig;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Invalid Argon2 params: {0}")]
    InvalidParams(String),

    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Invalid password hash format: {0}")]
    Format(String),

    #[error("Password hashing task panicked")]
    TaskPanicked,
}

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Salted one-way hash of `password`.
    async fn hash(&self, password: &str) -> Result<String, HashError>;

    /// Checks `password` against a hash produced by [`PasswordHasher::hash`].
    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, HashError>;
}

/// Argon2id hasher. Work runs on the blocking pool since it is CPU-intensive
/// and would stall the async runtime.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    pub fn new(config: &SecurityConfig) -> Result<Self, HashError> {
        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None, // output length (use default)
        )
        .map_err(|e| HashError::InvalidParams(e.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, HashError> {
        let argon2 = self.argon2();
        let password = password.to_string();

        task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| HashError::Hash(e.to_string()))
        })
        .await
        .map_err(|_| HashError::TaskPanicked)?
    }

    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, HashError> {
        let argon2 = self.argon2();
        let password = password.to_string();
        let password_hash = password_hash.to_string();

        // Params are read back from the PHC string, so hashes made under older
        // settings still verify.
        task::spawn_blocking(move || {
            let parsed_hash =
                PasswordHash::new(&password_hash).map_err(|e| HashError::Format(e.to_string()))?;

            Ok::<bool, HashError>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .map_err(|_| HashError::TaskPanicked)?
    }
}
