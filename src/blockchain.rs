use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::args::Args;
use crate::cache::{self, CacheService};
use crate::error::{BlockchainError, ConfigError};
use crate::metrics::Metrics;
use crate::solana_rpc::{HttpSolanaRpc, SolanaRpc, UpstreamBlock};

const BLOCK_CACHE_PREFIX: &str = "block";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    pub block_height: String,
    pub transaction_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_time: Option<i64>,
    pub blockhash: String,
}

pub fn normalize_block(block_number: u64, block: &UpstreamBlock) -> BlockInfo {
    BlockInfo {
        block_height: block_number.to_string(),
        transaction_count: block
            .signatures
            .as_ref()
            .map_or(0, |signatures| signatures.len() as u64),
        block_time: block.block_time,
        blockhash: block.blockhash.clone(),
    }
}

/// Read-through access to the upstream chain, one shared rpc client per process.
pub struct BlockchainService {
    rpc: Arc<dyn SolanaRpc>,
    cache: CacheService,
    metrics: Arc<Metrics>,
}

impl BlockchainService {
    pub fn new(rpc: Arc<dyn SolanaRpc>, cache: CacheService, metrics: Arc<Metrics>) -> Self {
        Self {
            rpc,
            cache,
            metrics,
        }
    }

    pub fn from_args(
        args: &Args,
        cache: CacheService,
        metrics: Arc<Metrics>,
    ) -> anyhow::Result<Self> {
        let rpc_url = args.rpc_url.clone().ok_or(ConfigError::MissingRpcUrl)?;

        let rpc = HttpSolanaRpc::new(
            rpc_url,
            args.commitment.clone(),
            args.rpc_timeout.map(Duration::from_secs),
        )?;

        tracing::info!(
            "Blockchain service initialized with endpoint: {}",
            rpc.rpc_url()
        );

        Ok(Self::new(Arc::new(rpc), cache, metrics))
    }

    pub async fn get_current_block_height(&self) -> Result<u64, BlockchainError> {
        self.record_call("getBlockHeight");

        match self.rpc.get_block_height().await {
            Ok(height) => {
                tracing::debug!("Fetched current block height: {height}");
                Ok(height)
            }
            Err(err) => {
                tracing::error!("Failed to fetch current block height: {err}");
                self.record_error("getBlockHeight", &err);
                Err(err)
            }
        }
    }

    pub async fn get_block_info(&self, block_number: u64) -> Result<BlockInfo, BlockchainError> {
        let cache_key = cache::generate_key(BLOCK_CACHE_PREFIX, Some(&block_number));

        if let Some(cached) = self.cache.get::<BlockInfo>(&cache_key) {
            tracing::debug!("Cache hit for block {block_number}");
            return Ok(cached);
        }

        self.record_call("getBlock");

        let block = self
            .rpc
            .get_block(block_number)
            .await
            .and_then(|block| block.ok_or(BlockchainError::NotFound))
            .map_err(|err| {
                tracing::error!("Failed to fetch block info for block {block_number}: {err}");
                self.record_error("getBlock", &err);
                err
            })?;

        let block_info = normalize_block(block_number, &block);
        self.cache.set(&cache_key, &block_info, None);

        tracing::debug!(
            "Fetched block {block_number} with {} transactions",
            block_info.transaction_count
        );

        Ok(block_info)
    }

    #[allow(dead_code)]
    pub async fn get_transaction_count(&self, block_number: u64) -> Result<u64, BlockchainError> {
        Ok(self.get_block_info(block_number).await?.transaction_count)
    }

    fn record_call(&self, method: &str) {
        self.metrics
            .upstream_call_counter
            .with_label_values(&[method])
            .inc();
    }

    fn record_error(&self, method: &str, err: &BlockchainError) {
        self.metrics
            .upstream_error_counter
            .with_label_values(&[method, err.kind()])
            .inc();
    }
}
