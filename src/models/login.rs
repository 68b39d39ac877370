use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::entities::login;

/// Keys the credential store and signup flow write into a login's `data`.
pub const LAST_SUCCESSFUL_LOGIN: &str = "lastSuccessfulLogin";
pub const LAST_FAILED_LOGIN: &str = "lastFailedLogin";
pub const EMAIL: &str = "email";
pub const ROLES: &str = "roles";

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    pub id: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub enabled: bool,

    pub created: DateTime<Utc>,

    pub data: Value,
}

impl Login {
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        has_role(&self.data, role)
    }
}

impl From<login::Model> for Login {
    fn from(model: login::Model) -> Self {
        Self {
            id: model.id,
            password_hash: model.password,
            enabled: model.enabled,
            created: model.created,
            data: model.data,
        }
    }
}

/// Whether a login document lists `role` under `roles`.
///
/// Accepts either an array of role names or an object keyed by role.
#[must_use]
pub fn has_role(data: &Value, role: &str) -> bool {
    match data.get(ROLES) {
        Some(Value::Array(roles)) => roles.iter().any(|r| r.as_str() == Some(role)),
        Some(Value::Object(roles)) => roles.contains_key(role),
        _ => false,
    }
}
