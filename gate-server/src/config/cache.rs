use std::fmt;
use std::time::Duration;

/// Session TTL used when `SESSION_TTL_SECONDS` is unset or invalid (1 hour)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Redis address used when `REDIS_ADDR` is unset
pub const DEFAULT_REDIS_ADDR: &str = "localhost:6379";

/// Specifies which cache store implementation backs the session cache
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CacheStore {
    InMemory,
    #[default]
    Redis,
    /// No backend; every session operation fails with a configuration error
    None,
}

impl CacheStore {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "in-memory" => Some(Self::InMemory),
            "redis" => Some(Self::Redis),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Configuration for the session cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache store type: "redis" (default), "in-memory" or "none"
    pub store: CacheStore,

    /// Lifetime of a stored session, resolved once at startup
    pub session_ttl: Duration,

    /// In-memory cache specific configuration
    pub memory: InMemoryConfig,

    /// Redis cache specific configuration
    pub redis: RedisConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            store: CacheStore::default(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            memory: InMemoryConfig::default(),
            redis: RedisConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration from environment variables
    pub fn from_env(config: &Self) -> Self {
        // Start with the provided configuration
        let mut result = config.clone();

        if let Some(store) = std::env::var("GATE_CACHE_STORE")
            .ok()
            .and_then(|value| CacheStore::parse(&value))
        {
            result.store = store;
        }

        let raw_ttl = std::env::var("SESSION_TTL_SECONDS").ok();
        result.session_ttl = parse_session_ttl(raw_ttl.as_deref());
        result.memory = InMemoryConfig::from_env(&result.memory);
        result.redis = RedisConfig::from_env(&result.redis);

        result
    }
}

/// Resolves the session TTL from its raw environment value.
///
/// Only a positive integer number of seconds is accepted; anything else,
/// including zero and negative values, silently yields the one hour default.
pub fn parse_session_ttl(raw: Option<&str>) -> Duration {
    let seconds = raw
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|seconds| *seconds > 0)
        .map(|seconds| seconds as u64)
        .unwrap_or(DEFAULT_SESSION_TTL_SECS);
    Duration::from_secs(seconds)
}

/// In-memory cache configuration options
#[derive(Debug, Clone)]
pub struct InMemoryConfig {
    /// Maximum capacity in MiB (default: 128 MiB)
    pub capacity: usize,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            capacity: 128, // 128 MiB
        }
    }
}

impl InMemoryConfig {
    /// Creates a new configuration from environment variables
    pub fn from_env(config: &Self) -> Self {
        let mut result = config.clone();

        if let Ok(capacity) = std::env::var("GATE_CACHE_MEMORY_CAPACITY") {
            if let Ok(parsed) = capacity.parse::<usize>() {
                result.capacity = parsed;
            }
        }

        result
    }
}

/// Redis connection options
#[derive(Clone)]
pub struct RedisConfig {
    /// `host:port` of the Redis server
    pub addr: String,

    /// Optional password sent with AUTH
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_REDIS_ADDR.to_string(),
            password: None,
        }
    }
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("addr", &self.addr)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RedisConfig {
    /// Creates a new configuration from environment variables
    pub fn from_env(config: &Self) -> Self {
        let mut result = config.clone();

        if let Ok(addr) = std::env::var("REDIS_ADDR") {
            if !addr.is_empty() {
                result.addr = addr;
            }
        }

        if let Ok(password) = std::env::var("REDIS_PASSWORD") {
            result.password = Some(password).filter(|p| !p.is_empty());
        }

        result
    }

    /// Connection URL without credentials
    pub fn url(&self) -> String {
        format!("redis://{}/", self.addr)
    }
}
