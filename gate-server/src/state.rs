use crate::cache::{Cache, CacheBackend};
use crate::config::GateConfig;
use crate::oauth_client::{CachedIntrospector, OAuthClient, TokenIntrospector};
use crate::session::SessionStore;
use log::info;
use std::sync::Arc;
use std::time::Duration;

/// Shared handles built once at startup and cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GateConfig>,
    pub cache: Arc<Cache>,
    pub sessions: SessionStore,
    pub oauth_client: Arc<OAuthClient>,
    pub introspector: Arc<dyn TokenIntrospector>,
}

impl AppState {
    /// Build the state with the introspection strategy selected by `config`
    pub fn new(config: GateConfig, cache: Cache) -> Result<Self, reqwest::Error> {
        let oauth_client = Arc::new(Self::create_oauth_client(&config)?);

        let introspector: Arc<dyn TokenIntrospector> = if config.introspection_cache_ttl > 0 {
            info!(
                "Caching active introspection results for {}s",
                config.introspection_cache_ttl
            );
            Arc::new(CachedIntrospector::new(
                oauth_client.clone(),
                Duration::from_secs(config.introspection_cache_ttl),
                config.introspection_cache_capacity,
            ))
        } else {
            oauth_client.clone()
        };

        Ok(Self::assemble(config, cache, oauth_client, introspector))
    }

    /// Build the state around a caller supplied introspector
    pub fn with_introspector(
        config: GateConfig,
        cache: Cache,
        introspector: Arc<dyn TokenIntrospector>,
    ) -> Result<Self, reqwest::Error> {
        let oauth_client = Arc::new(Self::create_oauth_client(&config)?);
        Ok(Self::assemble(config, cache, oauth_client, introspector))
    }

    fn create_oauth_client(config: &GateConfig) -> Result<OAuthClient, reqwest::Error> {
        OAuthClient::new(
            config.oauth.clone(),
            Duration::from_secs(config.client_timeout),
            Duration::from_secs(config.connect_timeout),
        )
    }

    fn assemble(
        config: GateConfig,
        cache: Cache,
        oauth_client: Arc<OAuthClient>,
        introspector: Arc<dyn TokenIntrospector>,
    ) -> Self {
        let cache = Arc::new(cache);
        let sessions = SessionStore::new(cache.clone(), config.cache.session_ttl);
        Self {
            config: Arc::new(config),
            cache,
            sessions,
            oauth_client,
            introspector,
        }
    }

    /// Check if all components are healthy
    pub async fn health_check(&self) -> bool {
        match self.cache.health_check().await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Cache health check failed: {}", e);
                false
            }
        }
    }
}
