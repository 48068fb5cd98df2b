use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BlockchainError;

const DEFAULT_JSON_RPC_VERSION: &str = "2.0";

#[derive(Serialize, Clone, Debug)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: DEFAULT_JSON_RPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Value,

    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

// Skipped or unavailable slots (-32004, -32007, -32009) are rejections too;
// only a `null` block means not found.
impl From<JsonRpcError> for BlockchainError {
    fn from(err: JsonRpcError) -> Self {
        BlockchainError::Upstream(format!("{} (code {})", err.message, err.code))
    }
}

impl JsonRpcResponse {
    /// Unwraps the envelope into the typed result, or the classified rpc error.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, BlockchainError> {
        if let Some(err) = self.error {
            return Err(err.into());
        }

        serde_json::from_value(self.result).map_err(|err| {
            BlockchainError::Upstream(format!("invalid rpc result: {err}"))
        })
    }
}
