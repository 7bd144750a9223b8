use redis::{Client, RedisError, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Get a JSON value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> redis::RedisResult<Option<T>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await?;

        value
            .map(|v| {
                serde_json::from_str(&v).map_err(|e| {
                    RedisError::from((
                        redis::ErrorKind::TypeError,
                        "Deserialization error",
                        e.to_string(),
                    ))
                })
            })
            .transpose()
    }

    /// Store a JSON value with an optional TTL
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> redis::RedisResult<()> {
        let serialized = serde_json::to_string(value).map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "Serialization error",
                e.to_string(),
            ))
        })?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(serialized);
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }

        cmd.query_async(&mut self.connection.clone()).await
    }

    pub async fn delete(&self, key: &str) -> redis::RedisResult<()> {
        redis::cmd("DEL")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await
    }
}

/// Cache key generators
pub mod keys {
    /// Every published portfolio as search items, newest first.
    pub fn published_listing() -> String {
        "portfolios:published".to_string()
    }
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub published_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            published_ttl: Duration::from_secs(300), // 5 minutes
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            published_ttl: parse_duration_secs("CACHE_TTL_PUBLISHED", 300),
        }
    }
}

fn parse_duration_secs(env_var: &str, default: u64) -> Duration {
    std::env::var(env_var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

/// Drop the cached public listing after a write that may have changed it.
pub async fn invalidate_published(cache: &RedisCache) {
    if let Err(e) = cache.delete(&keys::published_listing()).await {
        tracing::warn!("failed to invalidate published listing cache: {e}");
    }
}

/// Wrapper type for Actix-web app data
pub type CacheData = Arc<RedisCache>;
