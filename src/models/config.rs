use serde::{Deserialize, Serialize};

pub const SIGNUP_CONFIG_ID: &str = "signup";
pub const STARTUP_ACCOUNTS_CONFIG_ID: &str = "startupAccounts";

/// Signup policy stored in the `signup` config row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupPolicy {
    #[serde(rename = "allowOpenRegistration")]
    pub open_registration: bool,

    /// Cooldown before a freshly issued signup token becomes usable.
    #[serde(rename = "minSignupSeconds")]
    pub min_signup_delay_seconds: u32,

    /// Lifetime of a signup token.
    #[serde(rename = "maxSignupSeconds")]
    pub max_signup_delay_seconds: u32,

    #[serde(rename = "confirmationRequired")]
    pub confirmation_required: bool,
}

impl Default for SignupPolicy {
    fn default() -> Self {
        Self {
            open_registration: false,
            min_signup_delay_seconds: 10,
            max_signup_delay_seconds: 3600,
            confirmation_required: false,
        }
    }
}

/// State of the one-shot startup account bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupAccountsState {
    #[serde(default)]
    pub create: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signup_policy_uses_stored_key_names() {
        let policy: SignupPolicy = serde_json::from_value(json!({
            "allowOpenRegistration": true,
            "minSignupSeconds": 5,
            "maxSignupSeconds": 600,
            "confirmationRequired": true
        }))
        .unwrap();

        assert!(policy.open_registration);
        assert_eq!(policy.min_signup_delay_seconds, 5);
        assert_eq!(policy.max_signup_delay_seconds, 600);
        assert!(policy.confirmation_required);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let policy: SignupPolicy =
            serde_json::from_value(json!({ "allowOpenRegistration": true })).unwrap();
        assert!(policy.open_registration);
        assert_eq!(policy.min_signup_delay_seconds, 10);
        assert_eq!(policy.max_signup_delay_seconds, 3600);
    }
}
