use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Links and tokens reference both sides, so they go last.
        manager
            .create_table(
                schema
                    .create_table_from_entity(Login)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Actor)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(LoginActorLink)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(LoginToken)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(NodeConfig)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NodeConfig).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LoginToken).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LoginActorLink).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Actor).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Login).to_owned())
            .await?;

        Ok(())
    }
}
