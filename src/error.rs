use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Startup-time configuration errors. Any of these stops the process before it serves.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("SOLANA_RPC_URL environment variable is required")]
    MissingRpcUrl,

    #[error("Must specify redis url when using redis cache backend!")]
    MissingRedisUrl,

    #[error("Unknown cache backend specified: {0}!")]
    UnknownCacheType(String),
}

/// Failure classes of the upstream rpc, decided where the error is observed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockchainError {
    #[error("Block not found")]
    NotFound,

    #[error("RPC connection failed: {0}")]
    Unreachable(String),

    #[error("RPC request timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Upstream(String),
}

impl BlockchainError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BlockchainError::NotFound => "not_found",
            BlockchainError::Unreachable(_) => "unreachable",
            BlockchainError::Timeout(_) => "timeout",
            BlockchainError::Upstream(_) => "upstream",
        }
    }
}

/// Public error returned by the http surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn from_block_height_error(err: &BlockchainError) -> Self {
        match err {
            BlockchainError::Unreachable(_) => {
                ApiError::Internal("Unable to connect to blockchain network".to_string())
            }
            _ => ApiError::Internal("Unable to fetch current block height".to_string()),
        }
    }

    /// `block_number` is echoed back exactly as the client sent it.
    pub fn from_block_info_error(block_number: &str, err: &BlockchainError) -> Self {
        match err {
            BlockchainError::Timeout(_) => {
                ApiError::Internal("Request timeout - blockchain network is slow".to_string())
            }
            BlockchainError::NotFound => {
                ApiError::NotFound(format!("Block {block_number} not found or was skipped"))
            }
            BlockchainError::Unreachable(_) => ApiError::Internal(
                "Blockchain network error - please try again later".to_string(),
            ),
            // TODO: decide whether raw upstream text belongs in the public message
            BlockchainError::Upstream(message) => ApiError::Internal(format!(
                "Unable to fetch block {block_number} - Unable to fetch block information: {message}"
            )),
        }
    }

    pub fn invalid_block_number(raw: &str, reason: impl std::fmt::Display) -> Self {
        ApiError::Internal(format!("Unable to fetch block {raw} - {reason}"))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    status_code: u16,
    message: String,
    error: &'a str,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(ErrorBody {
            status_code: status.as_u16(),
            message: self.to_string(),
            error: status.canonical_reason().unwrap_or("Unknown"),
        })
    }
}
