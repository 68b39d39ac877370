//! `SeaORM` implementation of the `ConfigGate` trait.

use async_trait::async_trait;
use sea_orm::TransactionTrait;
use serde_json::Value;
use tracing::{info, warn};

use crate::db::{ConfigRepository, LoginRepository, Store};
use crate::models::config::SIGNUP_CONFIG_ID;
use crate::models::login::ADMIN_ROLE;
use crate::models::SignupPolicy;
use crate::services::config_gate::{ConfigGate, ConfigGateError, SetConfigOutcome};

pub struct SeaOrmConfigGate {
    store: Store,
}

impl SeaOrmConfigGate {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ConfigGate for SeaOrmConfigGate {
    async fn signup_policy(&self) -> Result<Option<SignupPolicy>, ConfigGateError> {
        let Some(doc) = self.store.config().get(SIGNUP_CONFIG_ID).await? else {
            return Ok(None);
        };

        let policy =
            serde_json::from_value(doc).map_err(|source| ConfigGateError::InvalidDocument {
                id: SIGNUP_CONFIG_ID.to_string(),
                source,
            })?;

        Ok(Some(policy))
    }

    async fn get_config(&self, id: &str) -> Result<Option<Value>, ConfigGateError> {
        Ok(self.store.config().get(id).await?)
    }

    async fn put_config(&self, id: &str, data: Value) -> Result<(), ConfigGateError> {
        self.store.config().put(id, data).await?;
        Ok(())
    }

    async fn set_config(
        &self,
        id: &str,
        data: Value,
        acting_login_id: &str,
        role: &str,
    ) -> Result<SetConfigOutcome, ConfigGateError> {
        // Write before reading so the transaction never upgrades a read lock.
        let txn = self.store.conn.begin().await?;
        ConfigRepository::new(&txn).put(id, data.clone()).await?;

        let Some(login) = LoginRepository::new(&txn).get(acting_login_id).await? else {
            txn.rollback().await?;
            warn!(
                action = "setConfig",
                config_id = id,
                login_id = acting_login_id,
                result = "unknownLogin"
            );
            return Ok(SetConfigOutcome::UnknownLogin);
        };

        if !login.has_role(role) {
            txn.rollback().await?;
            warn!(
                action = "setConfig",
                config_id = id,
                login_id = acting_login_id,
                role,
                result = "forbidden"
            );
            return Ok(SetConfigOutcome::Forbidden);
        }

        txn.commit().await?;

        info!(
            action = "setConfig",
            config_id = id,
            login_id = acting_login_id,
            result = "updated"
        );
        Ok(SetConfigOutcome::Updated(data))
    }

    async fn set_signup_policy(
        &self,
        acting_login_id: &str,
        policy: SignupPolicy,
    ) -> Result<SetConfigOutcome, ConfigGateError> {
        let doc = serde_json::to_value(policy).map_err(|source| {
            ConfigGateError::InvalidDocument {
                id: SIGNUP_CONFIG_ID.to_string(),
                source,
            }
        })?;

        self.set_config(SIGNUP_CONFIG_ID, doc, acting_login_id, ADMIN_ROLE)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn gate() -> (Store, SeaOrmConfigGate) {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        (store.clone(), SeaOrmConfigGate::new(store))
    }

    #[tokio::test]
    async fn seeded_policy_is_closed() {
        let (_store, gate) = gate().await;
        let policy = gate.signup_policy().await.unwrap().unwrap();
        assert_eq!(policy, SignupPolicy::default());
    }

    #[tokio::test]
    async fn only_admins_change_policy() {
        let (store, gate) = gate().await;
        store
            .logins()
            .create("root", "hash", Some(json!({ "roles": ["admin"] })))
            .await
            .unwrap();
        store.logins().create("pleb", "hash", None).await.unwrap();

        let open = SignupPolicy {
            open_registration: true,
            ..SignupPolicy::default()
        };

        assert_eq!(
            gate.set_signup_policy("pleb", open).await.unwrap(),
            SetConfigOutcome::Forbidden
        );
        assert_eq!(
            gate.set_signup_policy("ghost", open).await.unwrap(),
            SetConfigOutcome::UnknownLogin
        );
        assert!(!gate.signup_policy().await.unwrap().unwrap().open_registration);

        assert!(matches!(
            gate.set_signup_policy("root", open).await.unwrap(),
            SetConfigOutcome::Updated(_)
        ));
        assert!(gate.signup_policy().await.unwrap().unwrap().open_registration);
    }

    #[tokio::test]
    async fn role_is_checked_at_write_time() {
        let (store, gate) = gate().await;
        store
            .logins()
            .create("temp", "hash", Some(json!({ "roles": ["admin"] })))
            .await
            .unwrap();
        store
            .logins()
            .set_data("temp", &["roles"], &json!([]))
            .await
            .unwrap();

        assert_eq!(
            gate.set_config("custom", json!({ "x": 1 }), "temp", "admin")
                .await
                .unwrap(),
            SetConfigOutcome::Forbidden
        );
        assert!(gate.get_config("custom").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_policy_row_is_absent() {
        let (store, gate) = gate().await;
        use sea_orm::EntityTrait;
        crate::entities::node_config::Entity::delete_by_id(SIGNUP_CONFIG_ID.to_string())
            .exec(&store.conn)
            .await
            .unwrap();

        assert!(gate.signup_policy().await.unwrap().is_none());
    }
}
