//! `SeaORM` implementation of the `AccountProvisioner` trait.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::sync::Arc;
use tracing::{error, info};

use crate::crypto::{ActorKeypair, generate_keypair};
use crate::db::{
    ActorRepository, LinkRepository, LoginRepository, LoginTokenRepository, Store, StoreError,
};
use crate::domain::ConflictReason;
use crate::services::credential_service::CredentialStore;
use crate::services::provision_service::{
    AccountProvisioner, NewAccount, ProvisionError, ProvisionResult,
};

pub struct SeaOrmAccountProvisioner {
    store: Store,
    credentials: Arc<dyn CredentialStore>,
    key_bits: usize,
}

impl SeaOrmAccountProvisioner {
    #[must_use]
    pub fn new(store: Store, credentials: Arc<dyn CredentialStore>, key_bits: usize) -> Self {
        Self {
            store,
            credentials,
            key_bits,
        }
    }
}

#[async_trait]
impl AccountProvisioner for SeaOrmAccountProvisioner {
    async fn provision(&self, account: NewAccount) -> Result<ProvisionResult, ProvisionError> {
        let login_id = account.login_id.clone();
        let pun = account.pun.clone();

        let result: Result<ProvisionResult, ProvisionError> = async {
            let keypair = generate_keypair(self.key_bits).await?;
            let password_hash = self.credentials.hash(&account.password).await?;

            // Detached so that a dropped caller cannot leave the transaction
            // half-applied.
            let conn = self.store.conn.clone();
            tokio::spawn(create_in_transaction(conn, account, keypair, password_hash)).await?
        }
        .await;

        match &result {
            Ok(outcome) => {
                metrics::counter!("provision_outcomes_total", "outcome" => outcome.outcome_label())
                    .increment(1);
                info!(
                    action = "provision",
                    login_id = %login_id,
                    pun = %pun,
                    result = outcome.outcome_label(),
                    "Provisioning finished"
                );
            }
            Err(e) => {
                metrics::counter!("provision_outcomes_total", "outcome" => "error").increment(1);
                error!(
                    action = "provision",
                    login_id = %login_id,
                    pun = %pun,
                    error = %e,
                    "Provisioning failed"
                );
            }
        }

        result
    }
}

async fn create_in_transaction(
    conn: DatabaseConnection,
    account: NewAccount,
    keypair: ActorKeypair,
    password_hash: String,
) -> Result<ProvisionResult, ProvisionError> {
    let txn = conn.begin().await?;

    match create_rows(&txn, account, &keypair, &password_hash).await {
        Ok(created) => {
            txn.commit().await?;
            Ok(created)
        }
        Err(StoreError::Conflict(reason)) => {
            txn.rollback().await?;
            Ok(ProvisionResult::Conflict { reason })
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e.into())
        }
    }
}

async fn create_rows(
    txn: &DatabaseTransaction,
    account: NewAccount,
    keypair: &ActorKeypair,
    password_hash: &str,
) -> Result<ProvisionResult, StoreError> {
    let login = LoginRepository::new(txn)
        .create(&account.login_id, password_hash, account.login_data)
        .await?;

    if let Some(token) = &account.signup_token {
        let consumed = LoginTokenRepository::new(txn)
            .record(&account.login_id, token)
            .await?;
        if !consumed {
            return Err(StoreError::Conflict(ConflictReason::SignupToken));
        }
    }

    let actor = ActorRepository::new(txn)
        .create(&account.pun, keypair, account.actor_data)
        .await?;

    let link = LinkRepository::new(txn)
        .upsert(&account.login_id, &account.pun, account.owner)
        .await?;

    Ok(ProvisionResult::Created {
        login,
        actor,
        owner: link.owner,
    })
}
