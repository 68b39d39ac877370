//! One-shot creation of the accounts listed in `startup_accounts`.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::StartupAccountConfig;
use crate::models::StartupAccountsState;
use crate::models::config::STARTUP_ACCOUNTS_CONFIG_ID;
use crate::models::login::{EMAIL, ROLES};
use crate::services::config_gate::ConfigGate;
use crate::services::provision_service::{AccountProvisioner, NewAccount, ProvisionResult};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StartupReport {
    pub created: usize,
    pub conflicts: usize,
}

/// Provision every configured startup account, once.
///
/// Runs only while the `startupAccounts` config row says `create = true`, and
/// clears the flag afterwards. A missing row disables the bootstrap. Returns
/// `None` when nothing was attempted.
pub async fn create_startup_accounts(
    accounts: &[StartupAccountConfig],
    config: &dyn ConfigGate,
    provisioner: &dyn AccountProvisioner,
) -> Result<Option<StartupReport>> {
    if accounts.is_empty() {
        return Ok(None);
    }

    let Some(doc) = config
        .get_config(STARTUP_ACCOUNTS_CONFIG_ID)
        .await
        .context("Failed to read startup account state")?
    else {
        return Ok(None);
    };

    let state: StartupAccountsState =
        serde_json::from_value(doc).context("Invalid startupAccounts config row")?;
    if !state.create {
        return Ok(None);
    }

    let mut report = StartupReport::default();
    for account in accounts {
        let result = provisioner
            .provision(to_new_account(account))
            .await
            .with_context(|| format!("Failed to create startup account {}", account.login_id))?;

        match result {
            ProvisionResult::Created { login, actor, .. } => {
                report.created += 1;
                info!(
                    action = "startupAccounts",
                    login_id = %login.id,
                    pun = %actor.pun,
                    "Created startup account"
                );
            }
            ProvisionResult::Conflict { reason } => {
                report.conflicts += 1;
                warn!(
                    action = "startupAccounts",
                    login_id = %account.login_id,
                    conflict = %reason,
                    "Skipped startup account"
                );
            }
        }
    }

    let done = serde_json::to_value(StartupAccountsState { create: false })
        .context("Failed to encode startup account state")?;
    config
        .put_config(STARTUP_ACCOUNTS_CONFIG_ID, done)
        .await
        .context("Failed to clear startup account flag")?;

    Ok(Some(report))
}

fn to_new_account(account: &StartupAccountConfig) -> NewAccount {
    let mut data = Map::new();
    if let Some(email) = &account.email {
        data.insert(EMAIL.to_string(), Value::String(email.clone()));
    }
    if !account.roles.is_empty() {
        data.insert(
            ROLES.to_string(),
            Value::Array(account.roles.iter().cloned().map(Value::String).collect()),
        );
    }

    let pun = account.pun.as_deref().unwrap_or(&account.login_id);
    NewAccount::new(
        &account.login_id,
        &account.password,
        pun,
        account.owner.unwrap_or(true),
    )
    .with_login_data(Value::Object(data))
}
