//! Link login to actor command handler

use crate::db::StoreError;
use crate::state::SharedState;

pub async fn cmd_link(
    state: &SharedState,
    login_id: &str,
    pun: &str,
    owner: bool,
) -> anyhow::Result<()> {
    match state.store.links().upsert(login_id, pun, owner).await {
        Ok(link) => {
            let role = if link.owner { "owner" } else { "member" };
            println!("✓ Linked '{}' to '{}' as {role}", link.login_id, link.pun);
        }
        Err(StoreError::Conflict(_)) => {
            println!("✗ Could not link: login '{login_id}' or actor '{pun}' does not exist");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
