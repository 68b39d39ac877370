//! Node configuration rows, including the signup policy.

use serde_json::Value;
use thiserror::Error;

use crate::db::StoreError;
use crate::models::SignupPolicy;

#[derive(Debug, Error)]
pub enum ConfigGateError {
    #[error("Config row '{id}' is not valid: {source}")]
    InvalidDocument {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sea_orm::DbErr> for ConfigGateError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Store(StoreError::Database(err))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetConfigOutcome {
    Updated(Value),

    /// The acting login lacks the required role.
    Forbidden,

    /// The acting login does not exist.
    UnknownLogin,
}

#[async_trait::async_trait]
pub trait ConfigGate: Send + Sync {
    /// The stored signup policy, or `None` when the row is absent.
    async fn signup_policy(&self) -> Result<Option<SignupPolicy>, ConfigGateError>;

    async fn get_config(&self, id: &str) -> Result<Option<Value>, ConfigGateError>;

    /// Write a config row without any authorization check.
    async fn put_config(&self, id: &str, data: Value) -> Result<(), ConfigGateError>;

    /// Write a config row on behalf of `acting_login_id`, which must carry
    /// `role` in its `data.roles` at the time of the write.
    async fn set_config(
        &self,
        id: &str,
        data: Value,
        acting_login_id: &str,
        role: &str,
    ) -> Result<SetConfigOutcome, ConfigGateError>;

    /// Replace the signup policy. Requires the `admin` role.
    async fn set_signup_policy(
        &self,
        acting_login_id: &str,
        policy: SignupPolicy,
    ) -> Result<SetConfigOutcome, ConfigGateError>;
}
