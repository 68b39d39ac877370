use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::entities::{actor, login_actor_link};

use super::login::Login;

#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub pun: String,

    pub public_key_pem: String,

    /// PKCS#8 DER; used for outbound signing only
    #[serde(skip_serializing)]
    pub private_key: Vec<u8>,

    pub created: DateTime<Utc>,

    pub data: Value,
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("pun", &self.pun)
            .field("public_key_pem", &self.public_key_pem)
            .field("private_key", &"<redacted>")
            .field("created", &self.created)
            .field("data", &self.data)
            .finish()
    }
}

impl From<actor::Model> for Actor {
    fn from(model: actor::Model) -> Self {
        Self {
            pun: model.pun,
            public_key_pem: model.public_key_pem,
            private_key: model.private_key,
            created: model.created,
            data: model.data,
        }
    }
}

/// A (login, actor) association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub login_id: String,
    pub pun: String,
    pub owner: bool,
}

impl From<login_actor_link::Model> for Link {
    fn from(model: login_actor_link::Model) -> Self {
        Self {
            login_id: model.login_id,
            pun: model.pun,
            owner: model.owner,
        }
    }
}

/// One actor as seen from a login's side of the link table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorLink {
    pub pun: String,
    pub owner: bool,
}

impl From<Link> for ActorLink {
    fn from(link: Link) -> Self {
        Self {
            pun: link.pun,
            owner: link.owner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginWithActors {
    pub login: Login,
    pub actors: Vec<ActorLink>,
}
