pub mod lru_backend;
pub mod memory_backend;
pub mod redis_backend;

use std::fmt::Display;
use std::sync::Arc;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metrics::Metrics;

pub trait CacheBackendFactory: Send + Sync {
    fn get_instance(&self) -> anyhow::Result<Box<dyn CacheBackend>>;
}

pub trait CacheBackend {
    fn read(&mut self, key: &str) -> anyhow::Result<Option<Value>>;
    fn write(&mut self, key: &str, value: &Value, ttl_ms: u64) -> anyhow::Result<()>;
}

/// Value plus absolute expiry, as stored by the in-process backends.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CacheValue {
    pub data: Value,
    pub expires_at: i64,
}

impl CacheValue {
    pub fn new(data: Value, ttl_ms: u64) -> Self {
        let ttl_ms = i64::try_from(ttl_ms).unwrap_or(i64::MAX);

        Self {
            data,
            expires_at: chrono::Utc::now().timestamp_millis().saturating_add(ttl_ms),
        }
    }

    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp_millis() >= self.expires_at
    }

    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("fail to deserialize cache value")
    }

    pub fn to_string(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("fail to serialize cache value")
    }
}

/// Builds a cache key from a prefix and an optional identifier.
///
/// The identifier is rendered with `Display`, so `12345` and `"12345"` yield
/// the same key. An identifier that renders empty is treated as absent.
pub fn generate_key(prefix: &str, identifier: Option<&dyn Display>) -> String {
    match identifier.map(|id| id.to_string()) {
        Some(id) if !id.is_empty() => format!("{prefix}:{id}"),
        _ => prefix.to_string(),
    }
}

/// Best-effort cache accessor. Backend failures are logged and never
/// reach the caller: a failed read is a miss and a failed write is dropped.
pub struct CacheService {
    factory: Box<dyn CacheBackendFactory>,
    default_ttl: u64,
    metrics: Arc<Metrics>,
}

impl CacheService {
    pub fn new(
        factory: Box<dyn CacheBackendFactory>,
        default_ttl: u64,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            factory,
            default_ttl,
            metrics,
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get(key) {
            Ok(Some(value)) => {
                tracing::debug!("cache GET: {key} HIT");
                self.metrics.cache_hit_counter.inc();
                Some(value)
            }
            Ok(None) => {
                tracing::debug!("cache GET: {key} MISS");
                self.metrics.cache_miss_counter.inc();
                None
            }
            Err(err) => {
                tracing::error!("cache GET error for key {key}: {err:#}");
                self.metrics.cache_error_counter.inc();
                None
            }
        }
    }

    /// Stores `value` for `ttl` seconds, or the configured default when `ttl` is `None`.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<u64>) {
        let ttl_ms = ttl.unwrap_or(self.default_ttl).saturating_mul(1000);

        match self.try_set(key, value, ttl_ms) {
            Ok(()) => tracing::debug!("cache SET: {key} (TTL: {}s)", ttl_ms / 1000),
            Err(err) => {
                tracing::error!("cache SET error for key {key}: {err:#}");
                self.metrics.cache_error_counter.inc();
            }
        }
    }

    fn try_get<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        let mut backend = self
            .factory
            .get_instance()
            .context("fail to get cache backend")?;

        match backend.read(key)? {
            Some(value) => {
                let value =
                    serde_json::from_value(value).context("fail to decode cached value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn try_set<T: Serialize>(&self, key: &str, value: &T, ttl_ms: u64) -> anyhow::Result<()> {
        let value = serde_json::to_value(value).context("fail to encode cache value")?;

        let mut backend = self
            .factory
            .get_instance()
            .context("fail to get cache backend")?;

        backend.write(key, &value, ttl_ms)
    }
}
