//! Show account command handler

use crate::state::SharedState;

pub async fn cmd_account(state: &SharedState, login_id: &str) -> anyhow::Result<()> {
    let Some(account) = state.store.get_login_with_actors(login_id).await? else {
        println!("Login '{login_id}' not found.");
        return Ok(());
    };

    let login = &account.login;
    let status = if login.enabled { "enabled" } else { "disabled" };

    println!("Login: {} ({status})", login.id);
    println!("  Created: {}", login.created.to_rfc3339());
    println!("  Data: {}", serde_json::to_string_pretty(&login.data)?);

    if account.actors.is_empty() {
        println!("  No linked actors.");
    } else {
        println!("  Actors:");
        for actor in &account.actors {
            let role = if actor.owner { "owner" } else { "member" };
            println!("    {} [{role}]", actor.pun);
        }
    }

    Ok(())
}
