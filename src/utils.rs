use reqwest::Url;
use serde::Serialize;

use crate::error::BlockchainError;
use crate::json_rpc::JsonRpcResponse;

pub async fn do_rpc_request<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    rpc_url: Url,
    body: &T,
) -> Result<JsonRpcResponse, BlockchainError> {
    let response = client
        .post(rpc_url)
        .json(body)
        .send()
        .await
        .map_err(classify_transport_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(BlockchainError::Unreachable(format!(
            "rpc endpoint responded with status {status}"
        )));
    }

    response
        .json::<JsonRpcResponse>()
        .await
        .map_err(classify_transport_error)
}

pub fn classify_transport_error(err: reqwest::Error) -> BlockchainError {
    if err.is_timeout() {
        BlockchainError::Timeout(err.to_string())
    } else if err.is_connect() || err.is_request() {
        BlockchainError::Unreachable(err.to_string())
    } else {
        BlockchainError::Upstream(err.to_string())
    }
}
