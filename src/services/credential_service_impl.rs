//! `SeaORM` implementation of the `CredentialStore` trait.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::task;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::models::login::{LAST_FAILED_LOGIN, LAST_SUCCESSFUL_LOGIN};
use crate::services::credential_service::{
    CredentialError, CredentialStore, VerifyOutcome, hash_password, needs_rehash,
    password_matches,
};

pub struct SeaOrmCredentialStore {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmCredentialStore {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn record_attempt(&self, login_id: &str, key: &str) -> Result<(), CredentialError> {
        let now = Value::String(Utc::now().to_rfc3339());
        self.store.logins().set_data(login_id, &[key], &now).await?;
        Ok(())
    }

    async fn upgrade_hash(&self, login_id: &str, password: &str) {
        let result = match self.hash(password).await {
            Ok(hash) => self
                .store
                .logins()
                .update_password(login_id, &hash)
                .await
                .map_err(CredentialError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(_) => info!(action = "verify", login_id, "Upgraded password hash parameters"),
            Err(e) => warn!(action = "verify", login_id, error = %e, "Failed to upgrade password hash"),
        }
    }
}

#[async_trait]
impl CredentialStore for SeaOrmCredentialStore {
    async fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let password = password.to_string();
        let security = self.security.clone();

        task::spawn_blocking(move || hash_password(&password, &security)).await?
    }

    async fn verify(
        &self,
        login_id: &str,
        password: &str,
    ) -> Result<VerifyOutcome, CredentialError> {
        let Some(login) = self.store.logins().get(login_id).await? else {
            metrics::counter!("login_attempts_total", "result" => "not_found").increment(1);
            return Ok(VerifyOutcome::NotFound);
        };

        let stored = login.password_hash.clone();
        let supplied = password.to_string();
        let matches = task::spawn_blocking(move || password_matches(&supplied, &stored)).await?;

        if matches && login.enabled {
            self.record_attempt(login_id, LAST_SUCCESSFUL_LOGIN).await?;

            if self.security.rehash_on_login && needs_rehash(&login.password_hash, &self.security)
            {
                self.upgrade_hash(login_id, password).await;
            }

            metrics::counter!("login_attempts_total", "result" => "authenticated").increment(1);
            Ok(VerifyOutcome::Authenticated(login))
        } else {
            self.record_attempt(login_id, LAST_FAILED_LOGIN).await?;

            info!(
                action = "verify",
                login_id,
                enabled = login.enabled,
                result = "rejected",
                "Login rejected"
            );
            metrics::counter!("login_attempts_total", "result" => "rejected").increment(1);
            Ok(VerifyOutcome::Rejected)
        }
    }

    async fn enable(&self, login_id: &str, enabled: bool) -> Result<bool, CredentialError> {
        let state = self
            .store
            .logins()
            .set_enabled(login_id, enabled)
            .await?
            .ok_or_else(|| CredentialError::LoginNotFound(login_id.to_string()))?;

        info!(action = "enable", login_id, enabled = state, "Login state changed");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (Store, SeaOrmCredentialStore) {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        let security = SecurityConfig {
            memory_cost_kib: 1024,
            time_cost: 1,
            parallelism: 1,
            ..SecurityConfig::default()
        };
        let credentials = SeaOrmCredentialStore::new(store.clone(), security);
        (store, credentials)
    }

    #[tokio::test]
    async fn authenticated_returns_record_before_bookkeeping() {
        let (store, credentials) = setup().await;
        let hash = credentials.hash("pw").await.unwrap();
        store.logins().create("ann", &hash, None).await.unwrap();

        let VerifyOutcome::Authenticated(login) = credentials.verify("ann", "pw").await.unwrap()
        else {
            panic!("expected Authenticated");
        };
        assert!(login.data.get(LAST_SUCCESSFUL_LOGIN).is_none());

        let after = store.logins().get("ann").await.unwrap().unwrap();
        assert!(after.data[LAST_SUCCESSFUL_LOGIN].is_string());
    }

    #[tokio::test]
    async fn wrong_password_records_failure() {
        let (store, credentials) = setup().await;
        let hash = credentials.hash("pw").await.unwrap();
        store.logins().create("bea", &hash, None).await.unwrap();

        assert_eq!(
            credentials.verify("bea", "nope").await.unwrap(),
            VerifyOutcome::Rejected
        );

        let after = store.logins().get("bea").await.unwrap().unwrap();
        assert!(after.data[LAST_FAILED_LOGIN].is_string());
        assert!(after.data.get(LAST_SUCCESSFUL_LOGIN).is_none());
    }

    #[tokio::test]
    async fn unknown_login() {
        let (_store, credentials) = setup().await;
        assert_eq!(
            credentials.verify("nobody", "pw").await.unwrap(),
            VerifyOutcome::NotFound
        );
        assert!(matches!(
            credentials.enable("nobody", true).await,
            Err(CredentialError::LoginNotFound(_))
        ));
    }

    #[tokio::test]
    async fn rehash_on_login_upgrades_parameters() {
        let (store, credentials) = setup().await;
        let weak = SecurityConfig {
            memory_cost_kib: 512,
            time_cost: 1,
            parallelism: 1,
            ..SecurityConfig::default()
        };
        let old_hash = hash_password("pw", &weak).unwrap();
        store.logins().create("cal", &old_hash, None).await.unwrap();

        assert!(matches!(
            credentials.verify("cal", "pw").await.unwrap(),
            VerifyOutcome::Authenticated(_)
        ));

        let after = store.logins().get("cal").await.unwrap().unwrap();
        assert_ne!(after.password_hash, old_hash);
        assert!(!needs_rehash(&after.password_hash, &credentials.security));
        assert!(password_matches("pw", &after.password_hash));
    }
}
