//! Atomic creation of a login, its actor and the link between them.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::crypto::KeyError;
use crate::db::StoreError;
use crate::domain::ConflictReason;
use crate::models::{Actor, Login};
use crate::services::credential_service::CredentialError;

/// Infrastructure failures. Uniqueness conflicts are reported through
/// [`ProvisionResult::Conflict`] instead.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Provisioning task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<sea_orm::DbErr> for ProvisionError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Store(StoreError::Database(err))
    }
}

/// Everything needed to provision one account.
#[derive(Clone)]
pub struct NewAccount {
    pub login_id: String,
    pub password: String,
    pub pun: String,
    pub owner: bool,
    pub login_data: Option<Value>,
    pub actor_data: Option<Value>,
    /// A signup token to consume. Each token provisions at most one account.
    pub signup_token: Option<String>,
}

impl NewAccount {
    #[must_use]
    pub fn new(
        login_id: impl Into<String>,
        password: impl Into<String>,
        pun: impl Into<String>,
        owner: bool,
    ) -> Self {
        Self {
            login_id: login_id.into(),
            password: password.into(),
            pun: pun.into(),
            owner,
            login_data: None,
            actor_data: None,
            signup_token: None,
        }
    }

    #[must_use]
    pub fn with_login_data(mut self, data: Value) -> Self {
        self.login_data = Some(data);
        self
    }

    #[must_use]
    pub fn with_actor_data(mut self, data: Value) -> Self {
        self.actor_data = Some(data);
        self
    }

    #[must_use]
    pub fn with_signup_token(mut self, token: impl Into<String>) -> Self {
        self.signup_token = Some(token.into());
        self
    }
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("login_id", &self.login_id)
            .field("password", &"<redacted>")
            .field("pun", &self.pun)
            .field("owner", &self.owner)
            .field("login_data", &self.login_data)
            .field("actor_data", &self.actor_data)
            .field("signup_token", &self.signup_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionResult {
    Created {
        login: Login,
        actor: Actor,
        owner: bool,
    },

    /// The first uniqueness constraint that fired. Nothing was written.
    Conflict { reason: ConflictReason },
}

impl ProvisionResult {
    #[must_use]
    pub const fn conflict(&self) -> Option<ConflictReason> {
        match self {
            Self::Created { .. } => None,
            Self::Conflict { reason } => Some(*reason),
        }
    }

    #[must_use]
    pub const fn outcome_label(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Conflict { reason } => reason.as_str(),
        }
    }
}

#[async_trait::async_trait]
pub trait AccountProvisioner: Send + Sync {
    /// Create the login, signup token record, actor and link in one
    /// transaction.
    ///
    /// Steps run in that order; a conflict at any step rolls back the earlier
    /// ones. Once the transaction starts it runs to completion even if the
    /// returned future is dropped.
    async fn provision(&self, account: NewAccount) -> Result<ProvisionResult, ProvisionError>;
}
