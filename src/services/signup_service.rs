//! Token-gated self-service signup.

use serde::Serialize;
use thiserror::Error;

use crate::domain::ConflictReason;
use crate::services::config_gate::ConfigGateError;
use crate::services::provision_service::ProvisionError;
use crate::services::token_service::{InvalidReason, TokenError};

#[derive(Debug, Error)]
pub enum SignupError {
    #[error(transparent)]
    Config(#[from] ConfigGateError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupTokenOutcome {
    Issued {
        token: String,
        open_registration: bool,
    },

    /// No signup policy row exists.
    NotConfigured,
}

#[derive(Clone)]
pub struct SignupRequest {
    pub login_id: String,
    /// Defaults to `login_id`
    pub pun: Option<String>,
    pub password: String,
    pub email: Option<String>,
    pub token: Option<String>,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("login_id", &self.login_id)
            .field("pun", &self.pun)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SignupOutcome {
    #[serde(rename_all = "camelCase")]
    Created {
        login_id: String,
        pun: String,
        confirmation_required: bool,
        email: Option<String>,
    },

    Conflict {
        reason: ConflictReason,
    },

    RegistrationClosed,

    InvalidToken {
        reason: InvalidReason,
    },

    NotConfigured,
}

#[async_trait::async_trait]
pub trait SignupService: Send + Sync {
    /// Issue a signup token bound to `source`, usable within the policy's
    /// delay window.
    async fn issue_signup_token(&self, source: &str) -> Result<SignupTokenOutcome, SignupError>;

    /// Provision an owned account for a holder of a valid, unused signup
    /// token while open registration is allowed.
    async fn signup(&self, request: SignupRequest) -> Result<SignupOutcome, SignupError>;
}
