use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::{ActorLink, LoginWithActors};

pub mod error;
pub mod migrator;
pub mod repositories;

pub use error::StoreError;
pub use repositories::actor::ActorRepository;
pub use repositories::config::ConfigRepository;
pub use repositories::link::LinkRepository;
pub use repositories::login::LoginRepository;
pub use repositories::login_token::LoginTokenRepository;

/// Owns the connection pool. Cloning shares the pool.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        // An in-memory database lives only as long as its connection.
        if !db_url.contains(":memory:") {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub const fn logins(&self) -> LoginRepository<'_, DatabaseConnection> {
        LoginRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn actors(&self) -> ActorRepository<'_, DatabaseConnection> {
        ActorRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn links(&self) -> LinkRepository<'_, DatabaseConnection> {
        LinkRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn login_tokens(&self) -> LoginTokenRepository<'_, DatabaseConnection> {
        LoginTokenRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn config(&self) -> ConfigRepository<'_, DatabaseConnection> {
        ConfigRepository::new(&self.conn)
    }

    /// A login together with every actor linked to it, or `None` when the
    /// login does not exist. A login without links has an empty actor list.
    pub async fn get_login_with_actors(
        &self,
        login_id: &str,
    ) -> Result<Option<LoginWithActors>, StoreError> {
        let Some(login) = self.logins().get(login_id).await? else {
            return Ok(None);
        };

        let actors = self
            .links()
            .list_for_login(login_id)
            .await?
            .into_iter()
            .map(ActorLink::from)
            .collect();

        Ok(Some(LoginWithActors { login, actors }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> Store {
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn migrations_seed_config_rows() {
        let store = store().await;
        store.ping().await.unwrap();

        let signup = store.config().get("signup").await.unwrap().unwrap();
        assert_eq!(signup["allowOpenRegistration"], false);

        let startup = store.config().get("startupAccounts").await.unwrap().unwrap();
        assert_eq!(startup["create"], true);
    }

    #[tokio::test]
    async fn login_without_links_has_no_actors() {
        let store = store().await;
        store.logins().create("dave", "hash", None).await.unwrap();

        let found = store.get_login_with_actors("dave").await.unwrap().unwrap();
        assert_eq!(found.login.id, "dave");
        assert!(found.actors.is_empty());

        assert!(store.get_login_with_actors("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_login_is_classified() {
        let store = store().await;
        store.logins().create("erin", "hash", None).await.unwrap();

        let err = store.logins().create("erin", "other", None).await.unwrap_err();
        assert_eq!(err.conflict(), Some(crate::domain::ConflictReason::LoginId));
    }

    #[tokio::test]
    async fn set_data_creates_intermediate_objects() {
        let store = store().await;
        store.logins().create("fay", "hash", None).await.unwrap();

        let data = store
            .logins()
            .set_data("fay", &["profile", "color"], &serde_json::json!("blue"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(data["profile"]["color"], "blue");

        let login = store.logins().get("fay").await.unwrap().unwrap();
        assert_eq!(login.data["profile"]["color"], "blue");

        let missing = store
            .logins()
            .set_data("ghost", &["x"], &serde_json::json!(1))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn set_data_keeps_sibling_keys() {
        let store = store().await;
        store
            .logins()
            .create(
                "gil",
                "hash",
                Some(serde_json::json!({ "email": "gil@example.com", "roles": ["user"] })),
            )
            .await
            .unwrap();

        let data = store
            .logins()
            .set_data("gil", &["roles"], &serde_json::json!(["admin"]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            data,
            serde_json::json!({ "email": "gil@example.com", "roles": ["admin"] })
        );

        let data = store
            .logins()
            .set_data("gil", &[], &serde_json::json!({ "reset": true }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(data, serde_json::json!({ "reset": true }));
    }

    #[tokio::test]
    async fn actor_set_data_writes_nested_path() {
        let store = store().await;
        let keypair = crate::crypto::ActorKeypair::generate(1024).unwrap();
        store
            .actors()
            .create("zed", &keypair, Some(serde_json::json!({ "summary": "hi" })))
            .await
            .unwrap();

        let data = store
            .actors()
            .set_data("zed", &["profile", "banner"], &serde_json::json!("sea.png"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(data["summary"], "hi");
        assert_eq!(data["profile"]["banner"], "sea.png");

        let actor = store.actors().get("zed").await.unwrap().unwrap();
        assert_eq!(actor.data, data);

        let missing = store
            .actors()
            .set_data("nobody", &["x"], &serde_json::json!(1))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn set_enabled_reports_unknown_login() {
        let store = store().await;
        store.logins().create("gus", "hash", None).await.unwrap();

        assert_eq!(store.logins().set_enabled("gus", false).await.unwrap(), Some(false));
        assert_eq!(store.logins().set_enabled("gus", false).await.unwrap(), Some(false));
        assert_eq!(store.logins().set_enabled("nobody", true).await.unwrap(), None);

        let login = store.logins().get("gus").await.unwrap().unwrap();
        assert!(!login.enabled);
    }

    #[tokio::test]
    async fn signup_token_recorded_once() {
        let store = store().await;
        store.logins().create("hal", "hash", None).await.unwrap();
        store.logins().create("ida", "hash", None).await.unwrap();

        assert!(store.login_tokens().record("hal", "tok").await.unwrap());
        assert!(!store.login_tokens().record("ida", "tok").await.unwrap());
        assert_eq!(
            store.login_tokens().consumed_by("tok").await.unwrap().as_deref(),
            Some("hal")
        );
    }

    #[tokio::test]
    async fn config_put_replaces_document() {
        let store = store().await;
        store
            .config()
            .put("custom", serde_json::json!({"a": 1}))
            .await
            .unwrap();
        store
            .config()
            .put("custom", serde_json::json!({"b": 2}))
            .await
            .unwrap();

        let doc = store.config().get("custom").await.unwrap().unwrap();
        assert_eq!(doc, serde_json::json!({"b": 2}));
        assert!(store.config().get("absent").await.unwrap().is_none());
    }
}
