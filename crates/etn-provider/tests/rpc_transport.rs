use etn_provider::{HttpProvider, ProviderConfig, ProviderError, RpcClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
}

#[tokio::test]
async fn rpc_call_decodes_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_blockNumber"})))
        .respond_with(rpc_result(json!("0x10")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = HttpProvider::new(ProviderConfig::new(server.uri()).with_rate_limit(None)).unwrap();
    let height: String = provider.rpc_call("eth_blockNumber", ()).await.unwrap();
    assert_eq!(height, "0x10");
}

#[tokio::test]
async fn rpc_error_is_passed_through_without_failover() {
    let primary = MockServer::start().await;
    let fallback = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": 4001, "message": "User rejected the request."}
        })))
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!([])))
        .expect(0)
        .mount(&fallback)
        .await;

    let config = ProviderConfig::new(primary.uri()).with_fallback(fallback.uri());
    let provider = HttpProvider::new(config).unwrap();
    let err = provider
        .rpc_call::<_, Vec<String>>("eth_requestAccounts", ())
        .await
        .unwrap_err();
    assert_eq!(err.rpc_code(), Some(4001));
}

#[tokio::test]
async fn http_failure_is_returned_and_next_call_uses_fallback() {
    let primary = MockServer::start().await;
    let fallback = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!("0xc")))
        .expect(1)
        .mount(&fallback)
        .await;

    let config = ProviderConfig::new(primary.uri())
        .with_fallback(fallback.uri())
        .with_rate_limit(None);
    let provider = HttpProvider::new(config).unwrap();

    // The failing call is not repeated on the fallback
    let err = provider
        .rpc_call::<_, String>("eth_blockNumber", ())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::HttpStatus { status: 503, .. }));
    assert_eq!(provider.current_url().await, fallback.uri());

    let height: String = provider.rpc_call("eth_blockNumber", ()).await.unwrap();
    assert_eq!(height, "0xc");

    let stats = provider.stats().await;
    assert_eq!(stats[0].failures, 1);
    assert_eq!(stats[1].requests, 1);
    assert_eq!(stats[1].consecutive_failures, 0);
}

#[tokio::test]
async fn non_ascii_error_body_is_truncated_cleanly() {
    let server = MockServer::start().await;
    let body = format!("{}€ service unavailable €€€", "a".repeat(255));
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string(body))
        .mount(&server)
        .await;

    let provider = HttpProvider::new(ProviderConfig::new(server.uri()).with_rate_limit(None)).unwrap();
    let err = provider
        .rpc_call::<_, String>("eth_blockNumber", ())
        .await
        .unwrap_err();
    match err {
        ProviderError::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "a".repeat(255));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn null_result_is_none_for_optional_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(serde_json::Value::Null))
        .mount(&server)
        .await;

    let provider = HttpProvider::new(ProviderConfig::new(server.uri())).unwrap();
    let block: Option<serde_json::Value> = provider
        .rpc_call_optional("eth_getBlockByNumber", ("0x1", true))
        .await
        .unwrap();
    assert!(block.is_none());

    let err = provider
        .rpc_call::<_, serde_json::Value>("eth_getBlockByNumber", ("0x1", true))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::RpcError { code: -1, .. }));
}

#[tokio::test]
async fn get_rejects_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/price-history"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = RpcClient::new().unwrap();
    let err = client
        .get::<serde_json::Value>(&format!("{}/price-history", server.uri()))
        .await
        .unwrap_err();
    match err {
        ProviderError::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream down");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn hung_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!("0x1")).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let provider = HttpProvider::new(ProviderConfig::new(server.uri()).with_timeout(1)).unwrap();
    let err = provider
        .rpc_call::<_, String>("eth_blockNumber", ())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Timeout(1)));
    assert!(err.is_endpoint_failure());
}
