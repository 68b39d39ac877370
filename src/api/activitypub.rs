use axum::{
    extract::{Path, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::models::Actor;

pub const ACTIVITY_JSON: &str = "application/activity+json";

/// The ActivityPub `Person` document for an actor.
#[must_use]
pub fn person_document(actor: &Actor, base_url: &str) -> Value {
    let id = format!("{base_url}/ap/{}", actor.pun);

    json!({
        "@context": [
            "https://www.w3.org/ns/activitystreams",
            "https://w3id.org/security/v1"
        ],
        "id": id,
        "type": "Person",
        "preferredUsername": actor.pun,
        "inbox": format!("{id}/inbox"),
        "publicKey": {
            "id": format!("{id}#main-key"),
            "owner": id,
            "publicKeyPem": actor.public_key_pem
        }
    })
}

/// GET /ap/{pun}
pub async fn get_actor(
    State(state): State<Arc<AppState>>,
    Path(pun): Path<String>,
) -> Result<Response, ApiError> {
    let actor = state
        .shared
        .store
        .actors()
        .get(&pun)
        .await?
        .ok_or_else(|| ApiError::not_found("Actor", &pun))?;

    let body = person_document(&actor, state.shared.config.public_url());
    Ok(([(CONTENT_TYPE, ACTIVITY_JSON)], body.to_string()).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn person_document_shape() {
        let actor = Actor {
            pun: "alicepub".to_string(),
            public_key_pem: "-----BEGIN PUBLIC KEY-----".to_string(),
            private_key: vec![1, 2, 3],
            created: Utc::now(),
            data: json!({}),
        };

        let doc = person_document(&actor, "https://swan.example");
        assert_eq!(doc["id"], "https://swan.example/ap/alicepub");
        assert_eq!(doc["type"], "Person");
        assert_eq!(doc["preferredUsername"], "alicepub");
        assert_eq!(doc["inbox"], "https://swan.example/ap/alicepub/inbox");
        assert_eq!(
            doc["publicKey"]["id"],
            "https://swan.example/ap/alicepub#main-key"
        );
        assert_eq!(doc["publicKey"]["owner"], doc["id"]);
        assert!(!doc.to_string().contains("privateKey"));
    }
}
