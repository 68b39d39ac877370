use crate::entities::{node_config, prelude::*};
use crate::models::config::{SIGNUP_CONFIG_ID, STARTUP_ACCOUNTS_CONFIG_ID, SignupPolicy};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let signup = serde_json::to_value(SignupPolicy::default())
            .map_err(|e| DbErr::Custom(format!("Failed to encode signup policy: {e}")))?;

        // Startup accounts are created once, on the first boot that lists them.
        let startup = serde_json::json!({ "create": true });

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(NodeConfig)
            .columns([node_config::Column::Id, node_config::Column::Data])
            .values_panic([SIGNUP_CONFIG_ID.into(), signup.into()])
            .values_panic([STARTUP_ACCOUNTS_CONFIG_ID.into(), startup.into()])
            .on_conflict(
                OnConflict::column(node_config::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = sea_orm_migration::sea_query::Query::delete()
            .from_table(NodeConfig)
            .and_where(
                Expr::col(node_config::Column::Id)
                    .is_in([SIGNUP_CONFIG_ID, STARTUP_ACCOUNTS_CONFIG_ID]),
            )
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
