//! Default implementation of the `SignupService` trait.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

use crate::models::login::EMAIL;
use crate::services::config_gate::ConfigGate;
use crate::services::provision_service::{AccountProvisioner, NewAccount, ProvisionResult};
use crate::services::signup_service::{
    SignupError, SignupOutcome, SignupRequest, SignupService, SignupTokenOutcome,
};
use crate::services::token_service::{InvalidReason, TokenService, TokenVerdict};

pub struct DefaultSignupService {
    config: Arc<dyn ConfigGate>,
    tokens: Arc<TokenService>,
    provisioner: Arc<dyn AccountProvisioner>,
}

impl DefaultSignupService {
    #[must_use]
    pub fn new(
        config: Arc<dyn ConfigGate>,
        tokens: Arc<TokenService>,
        provisioner: Arc<dyn AccountProvisioner>,
    ) -> Self {
        Self {
            config,
            tokens,
            provisioner,
        }
    }

    fn check_token(&self, token: Option<&str>) -> Result<(), InvalidReason> {
        let token = token.ok_or(InvalidReason::Malformed)?;
        match self.tokens.verify(token) {
            TokenVerdict::Valid(claims) if claims.is_signup() => Ok(()),
            TokenVerdict::Valid(_) => Err(InvalidReason::Malformed),
            TokenVerdict::Invalid(reason) => Err(reason),
        }
    }
}

#[async_trait]
impl SignupService for DefaultSignupService {
    async fn issue_signup_token(&self, source: &str) -> Result<SignupTokenOutcome, SignupError> {
        let Some(policy) = self.config.signup_policy().await? else {
            info!(action = "signupToken", result = "failed", "No signup configuration");
            return Ok(SignupTokenOutcome::NotConfigured);
        };

        let token = self.tokens.issue_signup_token(
            source,
            policy.min_signup_delay_seconds,
            policy.max_signup_delay_seconds,
        )?;

        metrics::counter!("signup_tokens_issued_total").increment(1);
        info!(action = "signupToken", source, result = "success");

        Ok(SignupTokenOutcome::Issued {
            token,
            open_registration: policy.open_registration,
        })
    }

    async fn signup(&self, request: SignupRequest) -> Result<SignupOutcome, SignupError> {
        let Some(policy) = self.config.signup_policy().await? else {
            info!(action = "signup", result = "failed", "No signup configuration");
            return Ok(SignupOutcome::NotConfigured);
        };

        if !policy.open_registration {
            info!(action = "signup", result = "failed", "Open registration is closed");
            return Ok(SignupOutcome::RegistrationClosed);
        }

        if let Err(reason) = self.check_token(request.token.as_deref()) {
            info!(
                action = "signup",
                result = "failed",
                reason = reason.as_str(),
                "Invalid signup token"
            );
            return Ok(SignupOutcome::InvalidToken { reason });
        }

        let pun = request.pun.unwrap_or_else(|| request.login_id.clone());

        let mut login_data = Map::new();
        if let Some(email) = &request.email {
            login_data.insert(EMAIL.to_string(), Value::String(email.clone()));
        }

        let mut account = NewAccount::new(&request.login_id, request.password, &pun, true)
            .with_login_data(Value::Object(login_data));
        if let Some(token) = request.token {
            account = account.with_signup_token(token);
        }

        let outcome = match self.provisioner.provision(account).await? {
            ProvisionResult::Created { login, actor, .. } => SignupOutcome::Created {
                login_id: login.id,
                pun: actor.pun,
                confirmation_required: policy.confirmation_required,
                email: request.email,
            },
            ProvisionResult::Conflict { reason } => SignupOutcome::Conflict { reason },
        };

        Ok(outcome)
    }
}
