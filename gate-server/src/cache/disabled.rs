use super::{CacheBackend, CacheError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

const NOT_INITIALIZED: &str = "cache backend is not initialized";

/// DisabledCache stands in for a session backend that was never set up.
///
/// Unlike a cache miss, every operation fails with [`CacheError::Config`], so
/// callers can tell a deployment defect apart from an absent entry.
#[derive(Clone, Debug)]
pub struct DisabledCache;

impl DisabledCache {
    pub fn new() -> Self {
        DisabledCache
    }
}

impl Default for DisabledCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for DisabledCache {
    async fn set<T: Serialize + Send + Sync>(
        &self,
        _key: &str,
        _value: &T,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Err(CacheError::Config(NOT_INITIALIZED.to_string()))
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        _key: &str,
    ) -> Result<Option<T>, CacheError> {
        Err(CacheError::Config(NOT_INITIALIZED.to_string()))
    }

    async fn health_check(&self) -> Result<(), String> {
        Err(NOT_INITIALIZED.to_string())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Config(NOT_INITIALIZED.to_string()))
    }
}
