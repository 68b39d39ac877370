//! Password credentials: hashing, verification with attempt bookkeeping, and
//! enable/disable.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::db::StoreError;
use crate::models::Login;

/// Infrastructure failures of the credential store. Rejected passwords are
/// not errors; see [`VerifyOutcome`].
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Login not found: {0}")]
    LoginNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Credential task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<sea_orm::DbErr> for CredentialError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Store(StoreError::Database(err))
    }
}

/// Result of checking a password against a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The password matched an enabled login. The record is the one read
    /// before the attempt was recorded, so `data` does not yet carry the new
    /// `lastSuccessfulLogin`.
    Authenticated(Login),

    /// Wrong password or disabled login.
    Rejected,

    NotFound,
}

#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Hash a password with the configured argon2 parameters.
    async fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// Check a password and record the attempt in the login's `data`.
    ///
    /// The bookkeeping write has completed by the time this returns.
    async fn verify(&self, login_id: &str, password: &str)
    -> Result<VerifyOutcome, CredentialError>;

    /// Set the enabled flag and return the new state.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::LoginNotFound`] for an unknown login.
    async fn enable(&self, login_id: &str, enabled: bool) -> Result<bool, CredentialError>;
}

fn argon2_for(config: &SecurityConfig) -> Result<Argon2<'static>, CredentialError> {
    let params = Params::new(
        config.memory_cost_kib,
        config.time_cost,
        config.parallelism,
        None,
    )
    .map_err(|e| CredentialError::Hashing(format!("Invalid Argon2 params: {e}")))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password using Argon2id with the given params. CPU-bound.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2_for(config)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CredentialError::Hashing(e.to_string()))?;

    Ok(hash.to_string())
}

/// Whether `password` matches the PHC string `hash`. A hash that cannot be
/// parsed never matches. CPU-bound.
#[must_use]
pub fn password_matches(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Whether a stored hash was produced with different parameters than the
/// configured ones.
#[must_use]
pub fn needs_rehash(hash: &str, config: &SecurityConfig) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return true;
    };

    if parsed.algorithm != argon2::ARGON2ID_IDENT {
        return true;
    }

    Params::try_from(&parsed).map_or(true, |params| {
        params.m_cost() != config.memory_cost_kib
            || params.t_cost() != config.time_cost
            || params.p_cost() != config.parallelism
    })
}
