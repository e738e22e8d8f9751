use super::{TokenInfo, TokenIntrospector, TokenServiceError};
use async_trait::async_trait;
use log::debug;
use moka::future::Cache as MokaCache;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Reuses active introspection results for a short, fixed window.
///
/// Trades revocation freshness for fewer calls to the authorization server:
/// a token revoked upstream keeps passing for at most `ttl`. Inactive results
/// and errors are never cached, and neither is a token that expires inside
/// the window. Entries are keyed by a SHA-256 digest so raw tokens are not
/// held as map keys.
pub struct CachedIntrospector<I> {
    inner: I,
    cache: MokaCache<String, TokenInfo>,
    ttl: Duration,
}

impl<I: TokenIntrospector> CachedIntrospector<I> {
    pub fn new(inner: I, ttl: Duration, max_entries: u64) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(ttl)
            .max_capacity(max_entries)
            .build();
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl<I: TokenIntrospector> TokenIntrospector for CachedIntrospector<I> {
    async fn introspect(&self, token: &str) -> Result<TokenInfo, TokenServiceError> {
        let key = cache_key(token);
        if let Some(info) = self.cache.get(&key).await {
            debug!("Introspection cache hit");
            return Ok(info);
        }
        debug!("Introspection cache miss");

        let info = self.inner.introspect(token).await?;
        if info.active && !info.expires_within(self.ttl) {
            self.cache.insert(key, info.clone()).await;
        }
        Ok(info)
    }
}

fn cache_key(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("introspection:{:x}", hasher.finalize())
}
