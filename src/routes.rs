use actix_cors::Cors;
use actix_web::{web, HttpResponse};
use reqwest::Url;
use serde::Serialize;

use crate::app_state::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockHeightResponse {
    block_height: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/blockchain")
            .service(block_height)
            .service(block_info),
    );
}

/// Browser access is limited to `GET` from the configured origins.
pub fn cors(origins: &[Url]) -> Cors {
    origins.iter().fold(
        Cors::default()
            .allowed_methods(vec!["GET"])
            .allow_any_header()
            .max_age(3600),
        |cors, url| cors.allowed_origin(&url.origin().ascii_serialization()),
    )
}

#[actix_web::get("/block-height")]
async fn block_height(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let height = data
        .blockchain
        .get_current_block_height()
        .await
        .map_err(|err| ApiError::from_block_height_error(&err))?;

    Ok(HttpResponse::Ok().json(BlockHeightResponse {
        block_height: height.to_string(),
    }))
}

#[actix_web::get("/block-info/{block_number}")]
async fn block_info(
    path: web::Path<(String,)>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let (raw_block_number,) = path.into_inner();

    // anything that is not a u64 takes the generic failure path
    let block_number = raw_block_number.parse::<u64>().map_err(|err| {
        tracing::warn!("invalid block number {raw_block_number}: {err}");
        ApiError::invalid_block_number(
            &raw_block_number,
            format!("cannot parse `{raw_block_number}` as a block number: {err}"),
        )
    })?;

    let block_info = data
        .blockchain
        .get_block_info(block_number)
        .await
        .map_err(|err| ApiError::from_block_info_error(&raw_block_number, &err))?;

    Ok(HttpResponse::Ok().json(block_info))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::blockchain::test::{new_service, upstream_block, FakeRpc};
    use crate::cache::test::RecordingBackendFactory;
    use crate::error::BlockchainError;
    use crate::json_rpc::JsonRpcResponse;
    use crate::metrics::Metrics;
    use crate::solana_rpc::UpstreamBlock;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn app_state(rpc: FakeRpc) -> web::Data<AppState> {
        web::Data::new(AppState {
            blockchain: new_service(Arc::new(rpc), RecordingBackendFactory::default()),
            metrics: Arc::new(Metrics::new("test").unwrap()),
        })
    }

    async fn get(state: web::Data<AppState>, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;
        let request = test::TestRequest::get().uri(uri).to_request();
        let response = test::call_service(&app, request).await;
        let status = response.status();
        let body: Value = test::read_body_json(response).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_block_height() {
        let state = app_state(FakeRpc::with_height(Ok(100000000)));

        let (status, body) = get(state, "/blockchain/block-height").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"blockHeight": "100000000"}));
    }

    #[actix_web::test]
    async fn test_block_height_network_error() {
        let state = app_state(FakeRpc::with_height(Err(BlockchainError::Unreachable(
            "RPC network error".to_string(),
        ))));

        let (status, body) = get(state, "/blockchain/block-height").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "statusCode": 500,
                "message": "Unable to connect to blockchain network",
                "error": "Internal Server Error"
            })
        );
    }

    #[actix_web::test]
    async fn test_block_height_generic_error() {
        let state = app_state(FakeRpc::with_height(Err(BlockchainError::Upstream(
            "Unexpected error".to_string(),
        ))));

        let (status, body) = get(state, "/blockchain/block-height").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Unable to fetch current block height");
    }

    #[actix_web::test]
    async fn test_block_info() {
        let state = app_state(FakeRpc::with_block(Ok(Some(upstream_block()))));

        let (status, body) = get(state, "/blockchain/block-info/100000000").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "blockHeight": "100000000",
                "transactionCount": 3,
                "blockTime": 1691234567,
                "blockhash": "ABCD1234567890EFGH"
            })
        );
    }

    #[actix_web::test]
    async fn test_block_info_not_found() {
        let state = app_state(FakeRpc::with_block(Ok(None)));

        let (status, body) = get(state, "/blockchain/block-info/100000000").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({
                "statusCode": 404,
                "message": "Block 100000000 not found or was skipped",
                "error": "Not Found"
            })
        );
    }

    #[actix_web::test]
    async fn test_block_info_error_messages() {
        let cases = [
            (
                BlockchainError::Unreachable("connection refused".to_string()),
                "Blockchain network error - please try again later",
            ),
            (
                BlockchainError::Timeout("operation timed out".to_string()),
                "Request timeout - blockchain network is slow",
            ),
        ];

        for (err, message) in cases {
            let state = app_state(FakeRpc::with_block(Err(err)));
            let (status, body) = get(state, "/blockchain/block-info/100000000").await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["message"], message);
        }
    }

    #[actix_web::test]
    async fn test_block_info_generic_error_keeps_upstream_text() {
        let state = app_state(FakeRpc::with_block(Err(BlockchainError::Upstream(
            "Slot was skipped".to_string(),
        ))));

        let (status, body) = get(state, "/blockchain/block-info/100000000").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("Unable to fetch block 100000000 - "));
        assert!(message.contains("Unable to fetch block information"));
        assert!(message.contains("Slot was skipped"));
    }

    #[actix_web::test]
    async fn test_block_info_skipped_slot_response() {
        let response: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "error": {
                "code": -32007,
                "message": "Slot 100000000 was skipped, or missing due to ledger jump to recent snapshot"
            },
            "id": 1
        }))
        .unwrap();
        let state = app_state(FakeRpc::with_block(
            response.into_result::<Option<UpstreamBlock>>(),
        ));

        let (status, body) = get(state, "/blockchain/block-info/100000000").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["statusCode"], 500);
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("Unable to fetch block 100000000 - "));
        assert!(message.contains("Unable to fetch block information"));
        assert!(message.contains("Slot 100000000 was skipped"));
    }

    #[actix_web::test]
    async fn test_cors_allowed_origin() {
        let origins = vec![Url::parse("http://localhost:3000").unwrap()];
        let app = test::init_service(
            App::new()
                .wrap(cors(&origins))
                .app_data(app_state(FakeRpc::with_height(Ok(100000000))))
                .configure(configure),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/blockchain/block-height")
            .insert_header(("Origin", "http://localhost:3000"))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "http://localhost:3000"
        );
    }

    #[actix_web::test]
    async fn test_cors_unknown_origin() {
        let origins = vec![Url::parse("http://localhost:3000").unwrap()];
        let app = test::init_service(
            App::new()
                .wrap(cors(&origins))
                .app_data(app_state(FakeRpc::with_height(Ok(100000000))))
                .configure(configure),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/blockchain/block-height")
            .insert_header(("Origin", "http://evil.example.com"))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());
    }

    #[actix_web::test]
    async fn test_block_info_invalid_number() {
        for raw in ["invalid", "-1"] {
            let rpc = FakeRpc::with_block(Ok(Some(upstream_block())));
            let state = app_state(rpc);

            let (status, body) = get(state, &format!("/blockchain/block-info/{raw}")).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["statusCode"], 500);
            assert!(body["message"]
                .as_str()
                .unwrap()
                .starts_with(&format!("Unable to fetch block {raw} - ")));
        }
    }
}
