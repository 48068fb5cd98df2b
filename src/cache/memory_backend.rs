use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use super::{CacheBackend, CacheBackendFactory, CacheValue};

pub struct MemoryBackendFactory {
    data: Arc<DashMap<String, String>>,
}

impl MemoryBackendFactory {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }
}

impl CacheBackendFactory for MemoryBackendFactory {
    fn get_instance(&self) -> anyhow::Result<Box<dyn CacheBackend>> {
        Ok(Box::new(MemoryBackend {
            data: self.data.clone(),
        }))
    }
}

pub struct MemoryBackend {
    data: Arc<DashMap<String, String>>,
}

impl CacheBackend for MemoryBackend {
    fn read(&mut self, key: &str) -> anyhow::Result<Option<Value>> {
        let cache_value = match self.data.get(key) {
            Some(raw) => CacheValue::from_str(&raw)?,
            None => return Ok(None),
        };

        if cache_value.is_expired() {
            self.data.remove(key);
            return Ok(None);
        }

        Ok(Some(cache_value.data))
    }

    fn write(&mut self, key: &str, value: &Value, ttl_ms: u64) -> anyhow::Result<()> {
        let cache_value = CacheValue::new(value.clone(), ttl_ms);
        let _ = self.data.insert(key.to_string(), cache_value.to_string()?);
        Ok(())
    }
}
