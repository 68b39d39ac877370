use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde_json::Value;

use super::{data_update, empty_document};
use crate::db::error::{StoreError, classify};
use crate::domain::ConflictReason;
use crate::entities::login;
use crate::models::Login;

/// Data access for `login` rows.
///
/// Generic over the connection so the same queries run standalone or inside
/// a caller's transaction.
pub struct LoginRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> LoginRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a new, enabled login. A taken id is `StoreError::Conflict(LoginId)`.
    pub async fn create(
        &self,
        id: &str,
        password_hash: &str,
        data: Option<Value>,
    ) -> Result<Login, StoreError> {
        let model = login::ActiveModel {
            id: Set(id.to_string()),
            password: Set(password_hash.to_string()),
            enabled: Set(true),
            created: Set(Utc::now()),
            data: Set(data.unwrap_or_else(empty_document)),
        };

        let created = model
            .insert(self.conn)
            .await
            .map_err(|e| classify(e, ConflictReason::LoginId))?;

        Ok(Login::from(created))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Login>, StoreError> {
        let login = login::Entity::find_by_id(id.to_string())
            .one(self.conn)
            .await?;

        Ok(login.map(Login::from))
    }

    /// Returns the new state, or `None` when no such login exists.
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<Option<bool>, StoreError> {
        let result = login::Entity::update_many()
            .col_expr(login::Column::Enabled, Expr::value(enabled))
            .filter(login::Column::Id.eq(id))
            .exec(self.conn)
            .await?;

        Ok((result.rows_affected > 0).then_some(enabled))
    }

    /// Replace the stored hash. Returns false when no such login exists.
    pub async fn update_password(&self, id: &str, password_hash: &str) -> Result<bool, StoreError> {
        let result = login::Entity::update_many()
            .col_expr(login::Column::Password, Expr::value(password_hash))
            .filter(login::Column::Id.eq(id))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Write `value` at `path` in the login's `data` document and return the
    /// resulting document, or `None` when no such login exists.
    ///
    /// The write is one UPDATE statement, so it never holds a read lock that
    /// has to be upgraded.
    pub async fn set_data(
        &self,
        id: &str,
        path: &[&str],
        value: &Value,
    ) -> Result<Option<Value>, StoreError> {
        let result = login::Entity::update_many()
            .col_expr(login::Column::Data, data_update(path, value))
            .filter(login::Column::Id.eq(id))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        Ok(self.get(id).await?.map(|login| login.data))
    }
}
