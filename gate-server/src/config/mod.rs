pub use crate::config::cache::{CacheConfig, CacheStore};
pub use crate::config::oauth::OAuthConfig;
use config::{Config as ConfigCrate, ConfigError};
use serde::Deserialize;

pub mod cache;
pub mod oauth;

/// Main configuration structure for the gate server.
///
/// Process settings are read from `GATE_` prefixed variables. The
/// authorization server and session cache sections use the unprefixed
/// variables shared with the rest of the deployment (`HYDRA_*`, `REDIS_*`,
/// `REQUIRED_SCOPE`, `SESSION_TTL_SECONDS`).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GateConfig {
    /// The port the server will listen to (default: 8080)
    pub port: u16,

    /// Timeout for requests to the authorization server in seconds (default: 5)
    pub client_timeout: u64,

    /// Connect timeout for the authorization server in seconds (default: 2)
    pub connect_timeout: u64,

    /// Seconds an active introspection result may be reused (default: 0, disabled)
    pub introspection_cache_ttl: u64,

    /// Maximum number of cached introspection results (default: 10000)
    pub introspection_cache_capacity: u64,

    /// Run introspection on its own task so it is not aborted when the
    /// inbound request is dropped (default: false)
    pub introspection_detached: bool,

    /// Authorization server configuration
    #[serde(skip)]
    pub oauth: OAuthConfig,

    /// Session cache configuration
    #[serde(skip)]
    pub cache: CacheConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            client_timeout: 5,
            connect_timeout: 2,
            introspection_cache_ttl: 0,
            introspection_cache_capacity: 10_000,
            introspection_detached: false,
            oauth: OAuthConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl GateConfig {
    /// Creates a new Config instance from environment variables
    pub fn new() -> Result<Self, String> {
        let mut config: Self = ConfigCrate::builder()
            .add_source(
                config::Environment::with_prefix("GATE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e: ConfigError| e.to_string())?
            .try_deserialize()
            .map_err(|e| e.to_string())?;

        config.oauth = OAuthConfig::from_env()?;
        config.cache = CacheConfig::from_env(&config.cache);
        Ok(config)
    }

    #[cfg(test)]
    pub fn for_test_with_mock(hydra_mock: &wiremock::MockServer, required_scope: &str) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            oauth: OAuthConfig {
                introspection_url: Some(format!("{}/admin/oauth2/introspect", hydra_mock.uri())),
                token_url: Some(format!("{}/oauth2/token", hydra_mock.uri())),
                client_id: Some("test-client".to_string()),
                client_secret: Some("test-secret".to_string()),
                token_scope: Some("internal".to_string()),
                required_scope: Some(required_scope.to_string()),
            },
            cache: CacheConfig {
                store: CacheStore::InMemory,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
