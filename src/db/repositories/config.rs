use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, Set};
use serde_json::Value;

use crate::db::error::StoreError;
use crate::entities::node_config;

pub struct ConfigRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ConfigRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Value>, StoreError> {
        let row = node_config::Entity::find_by_id(id.to_string())
            .one(self.conn)
            .await?;

        Ok(row.map(|r| r.data))
    }

    /// Insert or replace the document stored under `id`.
    pub async fn put(&self, id: &str, data: Value) -> Result<(), StoreError> {
        let model = node_config::ActiveModel {
            id: Set(id.to_string()),
            data: Set(data),
        };

        node_config::Entity::insert(model)
            .on_conflict(
                OnConflict::column(node_config::Column::Id)
                    .update_column(node_config::Column::Data)
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await?;

        Ok(())
    }
}
