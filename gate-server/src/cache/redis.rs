use super::{CacheBackend, CacheError};
use crate::config::cache::RedisConfig;
use async_trait::async_trait;
use log::{debug, error};
use redis::{aio::ConnectionManager, AsyncCommands, Client, IntoConnectionInfo};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Upper bound on connecting and answering the startup `PING`
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis backed cache.
///
/// The connection manager multiplexes one connection and reconnects on
/// failure; clones share it, so a single instance serves every request.
#[derive(Clone)]
pub struct RedisCache {
    conn_manager: ConnectionManager,
}

impl RedisCache {
    /// Connect to Redis and verify the connection with `PING`
    pub async fn new(config: &RedisConfig) -> Result<Self, String> {
        let mut info = config
            .url()
            .into_connection_info()
            .map_err(|err| format!("Invalid Redis address '{}': {}", config.addr, err))?;
        info.redis.password = config.password.clone();

        let client = Client::open(info)
            .map_err(|err| format!("Failed to connect to Redis: {}", err))?;

        let conn_manager = tokio::time::timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
            .await
            .map_err(|_| format!("Timed out connecting to Redis at {}", config.addr))?
            .map_err(|err| format!("Failed to create Redis connection manager: {}", err))?;

        let mut conn = conn_manager.clone();
        match tokio::time::timeout(
            CONNECT_TIMEOUT,
            redis::cmd("PING").query_async::<String>(&mut conn),
        )
        .await
        {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => return Err(format!("Failed to ping Redis: {}", err)),
            Err(_) => return Err(format!("Timed out pinging Redis at {}", config.addr)),
        }

        debug!("Connected to Redis at {}", config.addr);
        Ok(Self { conn_manager })
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let serialized = serde_json::to_string(value)?;
        let mut conn = self.conn_manager.clone();
        // SETEX rejects a zero expiry
        let ttl_secs = ttl.as_secs().max(1);

        match conn.set_ex::<_, _, ()>(key, serialized, ttl_secs).await {
            Ok(_) => Ok(()),
            Err(err) => {
                error!("Redis error while setting key: {}", err);
                Err(CacheError::Backend(err.to_string()))
            }
        }
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>, CacheError> {
        let mut conn = self.conn_manager.clone();

        let result: Option<String> = match conn.get(key).await {
            Ok(value) => value,
            Err(err) => {
                error!("Redis error while getting key: {}", err);
                return Err(CacheError::Backend(err.to_string()));
            }
        };

        match result {
            Some(value) => serde_json::from_str(&value)
                .map_err(|e| CacheError::Deserialization(e.to_string()))
                .map(Some),
            None => Ok(None),
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        let mut conn = self.conn_manager.clone();
        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(_) => Ok(()),
            Err(err) => Err(format!("Redis health check failed: {}", err)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn_manager.clone();

        // DEL reports how many keys it removed; zero is not an error
        match conn.del::<_, ()>(key).await {
            Ok(_) => Ok(()),
            Err(err) => {
                error!("Redis error while deleting key: {}", err);
                Err(CacheError::Backend(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redis_test::server::RedisServer;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        field: String,
    }

    fn redis_config(server: &RedisServer) -> RedisConfig {
        let addr = match &server.addr {
            redis::ConnectionAddr::Tcp(host, port) => format!("{}:{}", host, port),
            _ => "127.0.0.1:6379".to_string(),
        };
        RedisConfig {
            addr,
            password: None,
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_cache_operations() {
        // Start a Redis server for testing
        let server = RedisServer::new();
        let cache = RedisCache::new(&redis_config(&server)).await.unwrap();

        let data = TestData {
            field: "test".to_string(),
        };

        cache
            .set("test_key", &data, Duration::from_secs(1))
            .await
            .unwrap();
        let retrieved: TestData = cache.get("test_key").await.unwrap().unwrap();
        assert_eq!(data, retrieved);

        // Test expiration
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(cache.get::<TestData>("test_key").await.unwrap().is_none());

        // Deleting an absent key succeeds
        cache.delete("test_key").await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_health_check() {
        let server = RedisServer::new();
        let cache = RedisCache::new(&redis_config(&server)).await.unwrap();

        let result = cache.health_check().await;

        assert!(result.is_ok(), "health check failed: {:?}", result);
    }

    #[tokio::test]
    async fn test_unreachable_redis_fails_fast() {
        let config = RedisConfig {
            addr: "127.0.0.1:1".to_string(),
            password: None,
        };
        assert!(RedisCache::new(&config).await.is_err());
    }
}
