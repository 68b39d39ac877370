//! Domain service for logging in and reading the logged-in account.

use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;
use crate::models::LoginWithActors;
use crate::services::credential_service::CredentialError;
use crate::services::token_service::TokenError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoginOutcome {
    LoggedIn { token: String },
    Rejected,
    NotFound,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues a session token.
    async fn login(&self, login_id: &str, password: &str) -> Result<LoginOutcome, AuthError>;

    /// The login and its linked actors, if the login exists.
    async fn account(&self, login_id: &str) -> Result<Option<LoginWithActors>, AuthError>;
}
