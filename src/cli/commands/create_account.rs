//! Create account command handler

use serde_json::{Map, Value};

use crate::models::login::{EMAIL, ROLES};
use crate::services::{NewAccount, ProvisionResult};
use crate::state::SharedState;

pub async fn cmd_create_account(
    state: &SharedState,
    login_id: &str,
    password: &str,
    pun: Option<&str>,
    owner: bool,
    roles: &[String],
    email: Option<&str>,
) -> anyhow::Result<()> {
    let pun = pun.unwrap_or(login_id);

    let mut data = Map::new();
    if let Some(email) = email {
        data.insert(EMAIL.to_string(), Value::String(email.to_string()));
    }
    if !roles.is_empty() {
        data.insert(
            ROLES.to_string(),
            Value::Array(roles.iter().cloned().map(Value::String).collect()),
        );
    }

    let account =
        NewAccount::new(login_id, password, pun, owner).with_login_data(Value::Object(data));

    match state.provisioner.provision(account).await? {
        ProvisionResult::Created { login, actor, owner } => {
            println!("✓ Created login '{}' with actor '{}'", login.id, actor.pun);
            if !owner {
                println!("  (linked without ownership)");
            }
        }
        ProvisionResult::Conflict { reason } => {
            println!("✗ Not created: {reason} is already taken");
        }
    }

    Ok(())
}
