use std::sync::Arc;

use anyhow::Context;

use crate::args::Args;
use crate::blockchain::BlockchainService;
use crate::cache::redis_backend::RedisBackendFactory;
use crate::cache::{lru_backend, memory_backend, CacheBackendFactory, CacheService};
use crate::error::ConfigError;
use crate::metrics::Metrics;

pub struct AppState {
    pub blockchain: BlockchainService,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(args: &Args) -> anyhow::Result<Self> {
        let metrics = Arc::new(
            Metrics::new(&args.metrics_prefix).context("fail to register metrics")?,
        );

        let cache_factory = new_cache_backend_factory(args)?;
        let cache = CacheService::new(cache_factory, args.cache_ttl, metrics.clone());

        let blockchain = BlockchainService::from_args(args, cache, metrics.clone())?;

        Ok(Self {
            blockchain,
            metrics,
        })
    }
}

fn new_cache_backend_factory(args: &Args) -> anyhow::Result<Box<dyn CacheBackendFactory>> {
    let factory: Box<dyn CacheBackendFactory> = match args.cache_type.as_str() {
        "redis" => match &args.redis_url {
            Some(redis_url) => {
                tracing::info!("Using redis cache backend");

                let client = redis::Client::open(redis_url.as_str())
                    .context("fail to create redis client")?;

                let conn_pool = r2d2::Pool::builder()
                    .max_size(300)
                    .test_on_check_out(false)
                    .build(client)
                    .context("fail to create redis connection pool")?;

                Box::new(RedisBackendFactory::new(conn_pool))
            }
            None => return Err(ConfigError::MissingRedisUrl.into()),
        },
        "memory" => {
            tracing::info!("Using in memory cache backend");
            Box::new(memory_backend::MemoryBackendFactory::new())
        }
        "lru" => {
            tracing::info!("Using LRU cache backend");
            Box::new(lru_backend::LruBackendFactory::new(args.max_cache_size)?)
        }
        other => return Err(ConfigError::UnknownCacheType(other.to_string()).into()),
    };

    Ok(factory)
}
