use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, Set};

use crate::db::error::StoreError;
use crate::entities::login_token;

pub struct LoginTokenRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> LoginTokenRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Record `token` as consumed by `login_id`.
    ///
    /// Returns false when the token was already recorded; the existing row is
    /// left untouched.
    pub async fn record(&self, login_id: &str, token: &str) -> Result<bool, StoreError> {
        let model = login_token::ActiveModel {
            token: Set(token.to_string()),
            login_id: Set(login_id.to_string()),
        };

        let rows = login_token::Entity::insert(model)
            .on_conflict(
                OnConflict::column(login_token::Column::Token)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await?;

        Ok(rows > 0)
    }

    /// The login that consumed `token`, if any.
    pub async fn consumed_by(&self, token: &str) -> Result<Option<String>, StoreError> {
        let row = login_token::Entity::find_by_id(token.to_string())
            .one(self.conn)
            .await?;

        Ok(row.map(|r| r.login_id))
    }
}
