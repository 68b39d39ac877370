//! Show signup policy command handler

use crate::state::SharedState;

pub async fn cmd_signup_policy(state: &SharedState) -> anyhow::Result<()> {
    let Some(policy) = state.config_gate.signup_policy().await? else {
        println!("No signup policy configured.");
        return Ok(());
    };

    let yes_no = |b: bool| if b { "yes" } else { "no" };

    println!("Signup policy");
    println!("{:-<40}", "");
    println!("  Open registration:     {}", yes_no(policy.open_registration));
    println!("  Confirmation required: {}", yes_no(policy.confirmation_required));
    println!("  Token usable after:    {}s", policy.min_signup_delay_seconds);
    println!("  Token expires after:   {}s", policy.max_signup_delay_seconds);

    Ok(())
}
