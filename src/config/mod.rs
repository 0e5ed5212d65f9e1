//! Process configuration.
//!
//! Built once at startup from an optional TOML file plus environment
//! overrides, then handed to the stores and connectors. Nothing reads the
//! environment after this point.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Complete hub configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    /// OAuth client settings keyed by provider name
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Externally reachable base URL, used to derive default redirect URIs
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Frontend base URL; when set, callbacks redirect there on success
    #[serde(default)]
    pub frontend_url: Option<String>,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_public_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            public_url: default_public_url(),
            frontend_url: None,
            cors_origins: default_cors_origins(),
        }
    }
}

/// Which key-value backend holds states and credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

/// Key-value store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Lifetime of a pending OAuth state
    #[serde(default = "default_state_ttl")]
    pub state_ttl_seconds: i64,
    /// How often the memory backend drops expired entries
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_state_ttl() -> i64 {
    600
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            redis_url: default_redis_url(),
            state_ttl_seconds: default_state_ttl(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

/// Credential persistence configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    /// Record lifetime; 0 keeps records until deleted
    #[serde(default)]
    pub ttl_seconds: u64,
    /// Include the org id in credential keys
    #[serde(default)]
    pub org_scoped: bool,
    /// Base64 32-byte AES-256-GCM master key
    #[serde(default)]
    pub encryption_key: Option<String>,
}

impl CredentialsConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_seconds > 0).then(|| Duration::from_secs(self.ttl_seconds))
    }
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}

/// OAuth client registration for one provider
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Callback URL registered with the provider
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Endpoint overrides (sandboxes, tests)
    #[serde(default)]
    pub auth_url: Option<String>,
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl ProviderConfig {
    /// A provider is usable once both client id and secret are set.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl HubConfig {
    /// Provider settings, if present and complete.
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name).filter(|p| p.is_configured())
    }

    /// Redirect URI for `provider`: the configured one, or
    /// `{public_url}/integrations/{provider}/oauth2callback`.
    pub fn redirect_uri(&self, provider: &str) -> String {
        self.providers
            .get(provider)
            .and_then(|p| p.redirect_uri.clone())
            .unwrap_or_else(|| {
                format!(
                    "{}/integrations/{}/oauth2callback",
                    self.server.public_url.trim_end_matches('/'),
                    provider
                )
            })
    }

    /// Applies process environment overrides.
    pub fn apply_env_overrides(&mut self, providers: &[&str]) {
        self.apply_overrides(providers, |name| std::env::var(name).ok());
    }

    /// Applies overrides from `lookup`:
    /// `{PROVIDER}_CLIENT_ID`, `{PROVIDER}_CLIENT_SECRET`, `{PROVIDER}_REDIRECT_URI`,
    /// `LINKHUB_BIND_ADDR`, `LINKHUB_PUBLIC_URL`, `LINKHUB_FRONTEND_URL`,
    /// `LINKHUB_REDIS_URL`, `LINKHUB_ENCRYPTION_KEY`.
    pub fn apply_overrides<F>(&mut self, providers: &[&str], lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());

        for provider in providers {
            let prefix = provider.to_uppercase();
            let client_id = lookup(&format!("{}_CLIENT_ID", prefix));
            let client_secret = lookup(&format!("{}_CLIENT_SECRET", prefix));
            let redirect_uri = lookup(&format!("{}_REDIRECT_URI", prefix));

            if client_id.is_none() && client_secret.is_none() && redirect_uri.is_none() {
                continue;
            }

            let entry = self.providers.entry(provider.to_string()).or_default();
            if let Some(v) = client_id {
                entry.client_id = v;
            }
            if let Some(v) = client_secret {
                entry.client_secret = v;
            }
            if redirect_uri.is_some() {
                entry.redirect_uri = redirect_uri;
            }
        }

        if let Some(v) = lookup("LINKHUB_BIND_ADDR") {
            self.server.bind_addr = v;
        }
        if let Some(v) = lookup("LINKHUB_PUBLIC_URL") {
            self.server.public_url = v;
        }
        if let Some(v) = lookup("LINKHUB_FRONTEND_URL") {
            self.server.frontend_url = Some(v);
        }
        if let Some(v) = lookup("LINKHUB_REDIS_URL") {
            self.store.redis_url = v;
            self.store.backend = StoreBackend::Redis;
        }
        if let Some(v) = lookup("LINKHUB_ENCRYPTION_KEY") {
            self.credentials.encryption_key = Some(v);
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<HubConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    let config: HubConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path))?;
    Ok(config)
}
