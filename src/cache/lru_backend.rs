use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use lru::LruCache;
use serde_json::Value;

use super::{CacheBackend, CacheBackendFactory, CacheValue};

pub struct LruBackendFactory {
    data: Arc<Mutex<LruCache<String, CacheValue>>>,
}

impl LruBackendFactory {
    pub fn new(cap: usize) -> anyhow::Result<Self> {
        let cap = NonZeroUsize::new(cap).context("lru cache size must be greater than zero")?;

        Ok(Self {
            data: Arc::new(Mutex::new(LruCache::new(cap))),
        })
    }
}

impl CacheBackendFactory for LruBackendFactory {
    fn get_instance(&self) -> anyhow::Result<Box<dyn CacheBackend>> {
        Ok(Box::new(LruBackend {
            data: self.data.clone(),
        }))
    }
}

pub struct LruBackend {
    data: Arc<Mutex<LruCache<String, CacheValue>>>,
}

impl CacheBackend for LruBackend {
    fn read(&mut self, key: &str) -> anyhow::Result<Option<Value>> {
        let mut lru_cache = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("lru cache lock poisoned"))?;

        let expired = match lru_cache.get(key) {
            Some(value) if !value.is_expired() => return Ok(Some(value.data.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            lru_cache.pop(key);
        }

        Ok(None)
    }

    fn write(&mut self, key: &str, value: &Value, ttl_ms: u64) -> anyhow::Result<()> {
        let mut lru_cache = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("lru cache lock poisoned"))?;

        let _ = lru_cache.put(key.to_string(), CacheValue::new(value.clone(), ttl_ms));
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zero_capacity() {
        assert!(LruBackendFactory::new(0).is_err());
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let factory = LruBackendFactory::new(2).unwrap();
        let mut backend = factory.get_instance().unwrap();

        backend.write("block:1", &json!(1), 60_000).unwrap();
        backend.write("block:2", &json!(2), 60_000).unwrap();
        // touch block:1 so block:2 becomes the eviction candidate
        assert_eq!(backend.read("block:1").unwrap(), Some(json!(1)));
        backend.write("block:3", &json!(3), 60_000).unwrap();

        assert_eq!(backend.read("block:2").unwrap(), None);
        assert_eq!(backend.read("block:1").unwrap(), Some(json!(1)));
        assert_eq!(backend.read("block:3").unwrap(), Some(json!(3)));
    }

    #[test]
    fn test_expired_entry_is_absent() {
        let factory = LruBackendFactory::new(10).unwrap();
        let mut backend = factory.get_instance().unwrap();

        backend.write("block:1", &json!(1), 0).unwrap();

        assert_eq!(backend.read("block:1").unwrap(), None);
        assert_eq!(factory.data.lock().unwrap().len(), 0);
    }
}
