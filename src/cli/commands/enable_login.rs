//! Enable/disable login command handler

use crate::services::CredentialError;
use crate::state::SharedState;

pub async fn cmd_enable_login(
    state: &SharedState,
    login_id: &str,
    enabled: bool,
) -> anyhow::Result<()> {
    match state.credentials.enable(login_id, enabled).await {
        Ok(true) => println!("✓ Login '{login_id}' enabled"),
        Ok(false) => println!("✓ Login '{login_id}' disabled"),
        Err(CredentialError::LoginNotFound(_)) => println!("Login '{login_id}' not found."),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
