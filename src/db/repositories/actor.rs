use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde_json::Value;

use super::{data_update, empty_document};
use crate::crypto::ActorKeypair;
use crate::db::error::{StoreError, classify};
use crate::domain::ConflictReason;
use crate::entities::actor;
use crate::models::Actor;

pub struct ActorRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ActorRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a new actor. A taken pun is `StoreError::Conflict(Pun)`.
    pub async fn create(
        &self,
        pun: &str,
        keypair: &ActorKeypair,
        data: Option<Value>,
    ) -> Result<Actor, StoreError> {
        let model = actor::ActiveModel {
            pun: Set(pun.to_string()),
            public_key_pem: Set(keypair.public_key_pem.clone()),
            private_key: Set(keypair.private_key_der().to_vec()),
            created: Set(Utc::now()),
            data: Set(data.unwrap_or_else(empty_document)),
        };

        let created = model
            .insert(self.conn)
            .await
            .map_err(|e| classify(e, ConflictReason::Pun))?;

        Ok(Actor::from(created))
    }

    pub async fn get(&self, pun: &str) -> Result<Option<Actor>, StoreError> {
        let actor = actor::Entity::find_by_id(pun.to_string())
            .one(self.conn)
            .await?;

        Ok(actor.map(Actor::from))
    }

    /// Write `value` at `path` in the actor's `data` document and return the
    /// resulting document, or `None` when no such actor exists.
    pub async fn set_data(
        &self,
        pun: &str,
        path: &[&str],
        value: &Value,
    ) -> Result<Option<Value>, StoreError> {
        let result = actor::Entity::update_many()
            .col_expr(actor::Column::Data, data_update(path, value))
            .filter(actor::Column::Pun.eq(pun))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        Ok(self.get(pun).await?.map(|actor| actor.data))
    }
}
