//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::db::Store;
use crate::models::LoginWithActors;
use crate::services::auth_service::{AuthError, AuthService, LoginOutcome};
use crate::services::credential_service::{CredentialStore, VerifyOutcome};
use crate::services::token_service::TokenService;

pub struct SeaOrmAuthService {
    store: Store,
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Store,
        credentials: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            store,
            credentials,
            tokens,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, login_id: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let outcome = match self.credentials.verify(login_id, password).await? {
            VerifyOutcome::Authenticated(login) => LoginOutcome::LoggedIn {
                token: self.tokens.issue_session_token(&login.id)?,
            },
            VerifyOutcome::Rejected => LoginOutcome::Rejected,
            VerifyOutcome::NotFound => LoginOutcome::NotFound,
        };

        let result = match &outcome {
            LoginOutcome::LoggedIn { .. } => "success",
            LoginOutcome::Rejected => "rejected",
            LoginOutcome::NotFound => "notFound",
        };
        info!(action = "login", login_id, result);

        Ok(outcome)
    }

    async fn account(&self, login_id: &str) -> Result<Option<LoginWithActors>, AuthError> {
        Ok(self.store.get_login_with_actors(login_id).await?)
    }
}
