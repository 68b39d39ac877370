use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{ActorLink, LoginWithActors};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login_id: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupTokenResponse {
    pub token: String,
    pub open_registration: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupBody {
    pub login_id: String,
    #[serde(default)]
    pub pun: Option<String>,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupCreatedResponse {
    pub login_id: String,
    pub pun: String,
    pub confirmation_required: bool,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAccountResponse {
    pub login_id: String,
    pub created: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfoResponse {
    pub login_id: String,
    pub created: String,
    pub enabled: bool,
    pub data: Value,
    pub actors: Vec<ActorLink>,
}

impl From<LoginWithActors> for AccountInfoResponse {
    fn from(account: LoginWithActors) -> Self {
        Self {
            login_id: account.login.id,
            created: account.login.created.to_rfc3339(),
            enabled: account.login.enabled,
            data: account.login.data,
            actors: account.actors,
        }
    }
}
