use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::BlockchainError;
use crate::json_rpc::{JsonRpcRequest, JsonRpcResponse};
use crate::utils;

/// The subset of a `getBlock` result this service reads.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamBlock {
    pub blockhash: String,

    #[serde(default)]
    pub block_time: Option<i64>,

    #[serde(default)]
    pub signatures: Option<Vec<String>>,
}

#[async_trait]
pub trait SolanaRpc: Send + Sync {
    async fn get_block_height(&self) -> Result<u64, BlockchainError>;

    /// `Ok(None)` when the node answered but has no block for `slot`.
    async fn get_block(&self, slot: u64) -> Result<Option<UpstreamBlock>, BlockchainError>;
}

pub struct HttpSolanaRpc {
    client: reqwest::Client,
    rpc_url: Url,
    commitment: String,
    next_id: AtomicU64,
}

impl HttpSolanaRpc {
    pub fn new(
        rpc_url: Url,
        commitment: String,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            rpc_url,
            commitment,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    async fn call(&self, method: &str, params: Value) -> Result<JsonRpcResponse, BlockchainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, params);

        utils::do_rpc_request(&self.client, self.rpc_url.clone(), &request).await
    }
}

/// Only signatures are requested; rewards and full transactions are skipped.
pub fn block_params(slot: u64, commitment: &str) -> Value {
    json!([
        slot,
        {
            "commitment": commitment,
            "encoding": "json",
            "maxSupportedTransactionVersion": 0,
            "transactionDetails": "signatures",
            "rewards": false
        }
    ])
}

#[async_trait]
impl SolanaRpc for HttpSolanaRpc {
    async fn get_block_height(&self) -> Result<u64, BlockchainError> {
        let params = json!([{ "commitment": self.commitment }]);

        self.call("getBlockHeight", params).await?.into_result()
    }

    async fn get_block(&self, slot: u64) -> Result<Option<UpstreamBlock>, BlockchainError> {
        self.call("getBlock", block_params(slot, &self.commitment))
            .await?
            .into_result()
    }
}
