use sea_orm_migration::prelude::*;

mod m20261019_create_identity_tables;
mod m20261019_seed_node_config;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_create_identity_tables::Migration),
            Box::new(m20261019_seed_node_config::Migration),
        ]
    }
}
