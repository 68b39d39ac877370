use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountProvisioner, AuthService, ConfigGate, CredentialStore, DefaultSignupService,
    SeaOrmAccountProvisioner, SeaOrmAuthService, SeaOrmConfigGate, SeaOrmCredentialStore,
    SignupService, TokenService,
};

/// Everything a request handler or CLI command needs, built once at startup
/// and passed explicitly.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: Arc<TokenService>,

    pub credentials: Arc<dyn CredentialStore>,

    pub provisioner: Arc<dyn AccountProvisioner>,

    pub config_gate: Arc<dyn ConfigGate>,

    pub signup_service: Arc<dyn SignupService>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store, Arc::new(SystemClock)))
    }

    /// Wire the services around an existing store and clock.
    #[must_use]
    pub fn with_store(config: Config, store: Store, clock: Arc<dyn Clock>) -> Self {
        let tokens = Arc::new(TokenService::from_config(&config.tokens, clock));

        let credentials = Arc::new(SeaOrmCredentialStore::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn CredentialStore>;

        let provisioner = Arc::new(SeaOrmAccountProvisioner::new(
            store.clone(),
            credentials.clone(),
            config.security.actor_key_bits,
        )) as Arc<dyn AccountProvisioner>;

        let config_gate = Arc::new(SeaOrmConfigGate::new(store.clone())) as Arc<dyn ConfigGate>;

        let signup_service = Arc::new(DefaultSignupService::new(
            config_gate.clone(),
            tokens.clone(),
            provisioner.clone(),
        )) as Arc<dyn SignupService>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            credentials.clone(),
            tokens.clone(),
        )) as Arc<dyn AuthService>;

        Self {
            config: Arc::new(config),
            store,
            tokens,
            credentials,
            provisioner,
            config_gate,
            signup_service,
            auth_service,
        }
    }
}
