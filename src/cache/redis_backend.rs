use anyhow::Context;
use redis::Commands;
use serde_json::{from_str, Value};

use super::{CacheBackend, CacheBackendFactory};

pub struct RedisBackendFactory {
    client: r2d2::Pool<redis::Client>,
}

impl RedisBackendFactory {
    pub fn new(client: r2d2::Pool<redis::Client>) -> Self {
        Self { client }
    }
}

impl CacheBackendFactory for RedisBackendFactory {
    fn get_instance(&self) -> anyhow::Result<Box<dyn CacheBackend>> {
        Ok(Box::new(RedisBackend {
            conn: self.client.get()?,
        }))
    }
}

pub struct RedisBackend {
    conn: r2d2::PooledConnection<redis::Client>,
}

impl CacheBackend for RedisBackend {
    fn read(&mut self, key: &str) -> anyhow::Result<Option<Value>> {
        let value: Option<String> = self.conn.get(key)?;

        match value {
            Some(value) => {
                let value = from_str::<Value>(&value).context("fail to deserialize cache value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    // expiry is left to redis
    fn write(&mut self, key: &str, value: &Value, ttl_ms: u64) -> anyhow::Result<()> {
        let value = serde_json::to_string(value).context("fail to serialize cache value")?;

        redis::cmd("PSETEX")
            .arg(key)
            .arg(ttl_ms.max(1))
            .arg(value)
            .query::<()>(&mut *self.conn)
            .context("fail to write cache value")?;

        Ok(())
    }
}
