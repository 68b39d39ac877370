use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::db::error::{StoreError, classify};
use crate::domain::ConflictReason;
use crate::entities::login_actor_link;
use crate::models::Link;

pub struct LinkRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> LinkRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert the pair, or update `owner` if the pair is already linked.
    ///
    /// Both sides must exist. A write that touches no row, or trips a
    /// constraint, is `StoreError::Conflict(OwnerLink)`.
    pub async fn upsert(&self, login_id: &str, pun: &str, owner: bool) -> Result<Link, StoreError> {
        let model = login_actor_link::ActiveModel {
            login_id: Set(login_id.to_string()),
            pun: Set(pun.to_string()),
            owner: Set(owner),
        };

        let rows = login_actor_link::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    login_actor_link::Column::LoginId,
                    login_actor_link::Column::Pun,
                ])
                .update_column(login_actor_link::Column::Owner)
                .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
            .map_err(|e| classify(e, ConflictReason::OwnerLink))?;

        if rows == 0 {
            return Err(StoreError::Conflict(ConflictReason::OwnerLink));
        }

        Ok(Link {
            login_id: login_id.to_string(),
            pun: pun.to_string(),
            owner,
        })
    }

    pub async fn get(&self, login_id: &str, pun: &str) -> Result<Option<Link>, StoreError> {
        let link = login_actor_link::Entity::find_by_id((login_id.to_string(), pun.to_string()))
            .one(self.conn)
            .await?;

        Ok(link.map(Link::from))
    }

    /// All actors linked to a login, ordered by pun.
    pub async fn list_for_login(&self, login_id: &str) -> Result<Vec<Link>, StoreError> {
        let links = login_actor_link::Entity::find()
            .filter(login_actor_link::Column::LoginId.eq(login_id))
            .order_by_asc(login_actor_link::Column::Pun)
            .all(self.conn)
            .await?;

        Ok(links.into_iter().map(Link::from).collect())
    }

    /// All logins linked to an actor, ordered by login id.
    pub async fn list_for_actor(&self, pun: &str) -> Result<Vec<Link>, StoreError> {
        let links = login_actor_link::Entity::find()
            .filter(login_actor_link::Column::Pun.eq(pun))
            .order_by_asc(login_actor_link::Column::LoginId)
            .all(self.conn)
            .await?;

        Ok(links.into_iter().map(Link::from).collect())
    }
}
