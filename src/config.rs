use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::crypto::DEFAULT_KEY_BITS;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub tokens: TokenConfig,

    pub observability: ObservabilityConfig,

    /// Accounts provisioned on first start.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub startup_accounts: Vec<StartupAccountConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,

    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/swanpipe.db".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Externally visible base URL, used to build ActivityPub ids.
    pub public_url: String,

    /// Take the client address from the first `X-Forwarded-For` entry.
    /// Only enable behind a proxy that sets the header.
    pub trust_forwarded_for: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_url: "http://localhost:8080".to_string(),
            trust_forwarded_for: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB
    pub memory_cost_kib: u32,

    /// Argon2 iterations
    pub time_cost: u32,

    pub parallelism: u32,

    /// Re-hash a password on successful login when its stored parameters
    /// differ from the ones above.
    pub rehash_on_login: bool,

    /// RSA modulus size for new actor keys
    pub actor_key_bits: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            memory_cost_kib: 8192,
            time_cost: 3,
            parallelism: 1,
            rehash_on_login: true,
            actor_key_bits: DEFAULT_KEY_BITS,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// `iss` claim of every issued token
    pub issuer: String,

    /// HMAC secret. When empty a random secret is generated at startup, which
    /// invalidates all tokens on restart.
    pub signing_secret: String,

    /// Session lifetime in days; 0 means one calendar month.
    pub session_lifetime_days: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: "swanpipe".to_string(),
            signing_secret: String::new(),
            session_lifetime_days: 0,
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("issuer", &self.issuer)
            .field("signing_secret", &"<redacted>")
            .field("session_lifetime_days", &self.session_lifetime_days)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StartupAccountConfig {
    pub login_id: String,

    pub password: String,

    /// Defaults to `login_id`
    #[serde(default)]
    pub pun: Option<String>,

    /// Defaults to true
    #[serde(default)]
    pub owner: Option<bool>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub roles: Vec<String>,
}

impl fmt::Debug for StartupAccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartupAccountConfig")
            .field("login_id", &self.login_id)
            .field("password", &"<redacted>")
            .field("pun", &self.pun)
            .field("owner", &self.owner)
            .field("email", &self.email)
            .field("roles", &self.roles)
            .finish()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("swanpipe").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".swanpipe").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_url.trim().is_empty() {
            anyhow::bail!("general.database_url cannot be empty");
        }

        if self.security.actor_key_bits < 512 {
            anyhow::bail!(
                "security.actor_key_bits must be at least 512 (got {})",
                self.security.actor_key_bits
            );
        }

        let public_url = url::Url::parse(&self.server.public_url)
            .with_context(|| format!("server.public_url is not a URL: {}", self.server.public_url))?;
        if !matches!(public_url.scheme(), "http" | "https") {
            anyhow::bail!("server.public_url must use http or https");
        }

        if let Some(account) = self
            .startup_accounts
            .iter()
            .find(|a| a.login_id.trim().is_empty())
        {
            anyhow::bail!("startup account with empty login_id: {account:?}");
        }

        Ok(())
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn public_url(&self) -> &str {
        self.server.public_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tokens.issuer, "swanpipe");
        assert_eq!(config.security.actor_key_bits, 2048);
        assert!(config.startup_accounts.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[tokens]"));
        assert!(toml_str.contains("[security]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [security]
            actor_key_bits = 1024

            [[startup_accounts]]
            login_id = "admin"
            password = "secret"
            roles = ["admin"]
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.security.actor_key_bits, 1024);
        assert_eq!(config.startup_accounts.len(), 1);
        assert_eq!(config.startup_accounts[0].roles, vec!["admin"]);
        assert!(config.startup_accounts[0].pun.is_none());

        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_validation_rejects_small_keys() {
        let mut config = Config::default();
        config.security.actor_key_bits = 256;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_public_url() {
        let mut config = Config::default();
        config.server.public_url = "node.example".to_string();
        assert!(config.validate().is_err());

        config.server.public_url = "ftp://node.example".to_string();
        assert!(config.validate().is_err());

        config.server.public_url = "https://node.example/".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_startup_login() {
        let mut config = Config::default();
        config.startup_accounts.push(StartupAccountConfig {
            login_id: " ".to_string(),
            password: "pw".to_string(),
            pun: None,
            owner: None,
            email: None,
            roles: Vec::new(),
        });
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("empty login_id"));
        assert!(!err.contains("\"pw\""));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = Config::default();
        config.tokens.signing_secret = "hunter2".to_string();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
