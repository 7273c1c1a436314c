use etn_electroneum::prelude::*;
use etn_electroneum::ELECTRONEUM_MAINNET_CHAIN_ID;
use etn_provider::ProviderConfig;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALICE: &str = "0x00000000000000000000000000000000000000a1";
const BOB: &str = "0x00000000000000000000000000000000000000b2";
const CAROL: &str = "0x00000000000000000000000000000000000000c3";

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
}

fn rpc_failure(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {"code": code, "message": message}
    }))
}

async fn mock_rpc(server: &MockServer, rpc_method: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": rpc_method})))
        .respond_with(response)
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> ChainClient {
    let config = ProviderConfig::new(server.uri()).with_rate_limit(None);
    ChainClient::with_provider_config(NetworkConfig::mainnet(), config).unwrap()
}

fn tx(hash: &str, from: &str, to: Option<&str>, value: &str) -> serde_json::Value {
    json!({"hash": hash, "from": from, "to": to, "value": value, "input": "0x"})
}

#[tokio::test]
async fn balance_of_one_etn_renders_as_one_point_zero_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getBalance"})))
        .respond_with(rpc_result(json!("0xde0b6b3a7640000")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let balance = client.get_balance(parse_address(ALICE).unwrap()).await.unwrap();
    assert_eq!(balance.to_fixed(2), "1.00");
    assert_eq!(balance.to_string(), "1.00");
}

#[tokio::test]
async fn node_error_surfaces_as_rpc_error() {
    let server = MockServer::start().await;
    mock_rpc(&server, "eth_getBalance", rpc_failure(-32000, "header not found")).await;

    let client = client_for(&server);
    let err = client.get_balance(parse_address(ALICE).unwrap()).await.unwrap_err();
    match err {
        DashboardError::RpcError { method, reason } => {
            assert_eq!(method, "eth_getBalance");
            assert!(reason.contains("header not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn failed_read_is_not_retried_on_fallback() {
    let primary = MockServer::start().await;
    let fallback = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getBalance"})))
        .respond_with(rpc_result(json!("0xde0b6b3a7640000")))
        .expect(1)
        .mount(&fallback)
        .await;

    let config = ProviderConfig::new(primary.uri())
        .with_fallback(fallback.uri())
        .with_rate_limit(None);
    let client = ChainClient::with_provider_config(NetworkConfig::mainnet(), config).unwrap();
    let alice = parse_address(ALICE).unwrap();

    let err = client.get_balance(alice).await.unwrap_err();
    assert!(matches!(err, DashboardError::RpcError { ref method, .. } if method == "eth_getBalance"));

    // The next read goes to the fallback
    assert_eq!(client.get_balance(alice).await.unwrap().to_string(), "1.00");
}

#[tokio::test]
async fn raw_reads() {
    let server = MockServer::start().await;
    mock_rpc(&server, "eth_chainId", rpc_result(json!("0xcb2e"))).await;
    mock_rpc(&server, "eth_blockNumber", rpc_result(json!("0x64"))).await;
    mock_rpc(&server, "eth_gasPrice", rpc_result(json!("0x3b9aca00"))).await;

    let client = client_for(&server);
    assert_eq!(client.chain_id().await.unwrap(), ELECTRONEUM_MAINNET_CHAIN_ID);
    assert_eq!(client.block_number().await.unwrap(), 100);
    assert_eq!(client.gas_price().await.unwrap().base_units(), U256::from(1_000_000_000u64));
}

#[tokio::test]
async fn scan_keeps_only_transactions_touching_the_address() {
    let server = MockServer::start().await;
    mock_rpc(&server, "eth_blockNumber", rpc_result(json!("0x2"))).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getBlockByNumber", "params": ["0x2", true]})))
        .respond_with(rpc_result(json!({
            "number": "0x2",
            "timestamp": "0x659200bc",
            "transactions": [
                tx("0x21", ALICE, Some(BOB), "0x22b1c8c1227a0000"),
                tx("0x22", BOB, Some(CAROL), "0x1"),
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getBlockByNumber", "params": ["0x1", true]})))
        .respond_with(rpc_result(json!({
            "number": "0x1",
            "timestamp": "0x65920000",
            "transactions": [tx("0x11", CAROL, Some(ALICE), "0xde0b6b3a7640000")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getBlockByNumber", "params": ["0x0", true]})))
        .respond_with(rpc_result(json!({"number": "0x0", "timestamp": "0x0", "transactions": []})))
        .mount(&server)
        .await;

    let client = Arc::new(client_for(&server));
    let alice = parse_address(ALICE).unwrap();
    let scanner = TransactionScanner::new(client);

    // limit larger than the chain: stops at genesis
    let records = scanner.scan(alice, 10, &CancellationToken::new()).await.unwrap();

    let hashes: Vec<&str> = records.iter().map(|r| r.hash.as_str()).collect();
    assert_eq!(hashes, vec!["0x21", "0x11"]);
    assert!(records.iter().all(|r| r.touches(&alice)));
    assert_eq!(records[0].value.to_decimal_string(), "2.5");
    assert_eq!(records[0].block_number, 2);
    assert_eq!(records[0].date.as_deref(), Some("2024-01-01 00:01"));
    assert_eq!(records[1].direction_for(&alice), Direction::Received);
}

#[tokio::test]
async fn scan_only_reads_the_most_recent_blocks() {
    let server = MockServer::start().await;
    mock_rpc(&server, "eth_blockNumber", rpc_result(json!("0x64"))).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getBlockByNumber"})))
        .respond_with(rpc_result(json!({"number": "0x64", "timestamp": "0x0", "transactions": []})))
        .expect(3)
        .mount(&server)
        .await;

    let client = Arc::new(client_for(&server));
    let scanner = TransactionScanner::new(client);
    let records = scanner
        .scan(parse_address(ALICE).unwrap(), 3, &CancellationToken::new())
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn missing_block_aborts_scan() {
    let server = MockServer::start().await;
    mock_rpc(&server, "eth_blockNumber", rpc_result(json!("0x5"))).await;
    mock_rpc(&server, "eth_getBlockByNumber", rpc_result(serde_json::Value::Null)).await;

    let client = Arc::new(client_for(&server));
    let err = TransactionScanner::new(client)
        .scan(parse_address(ALICE).unwrap(), 10, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::ScanFailed { block: 5, .. }));
}

#[tokio::test]
async fn failed_block_fetch_aborts_without_partial_result() {
    let server = MockServer::start().await;
    mock_rpc(&server, "eth_blockNumber", rpc_result(json!("0x5"))).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getBlockByNumber", "params": ["0x5", true]})))
        .respond_with(rpc_result(json!({
            "number": "0x5",
            "timestamp": "0x0",
            "transactions": [tx("0x51", ALICE, Some(BOB), "0x1")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getBlockByNumber", "params": ["0x4", true]})))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = Arc::new(client_for(&server));
    let err = TransactionScanner::new(client)
        .scan(parse_address(ALICE).unwrap(), 10, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::ScanFailed { block: 4, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn send_without_signer_fails_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!("0x0")))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.send_transaction(BOB, "1.0").await.unwrap_err();
    assert!(matches!(err, DashboardError::NoSigner));
    assert_eq!(
        err.user_message(),
        "Transaction failed. Please check your balance and try again."
    );

    tokio_test::assert_err!(client.send_transaction("0xnope", "1.0").await);
    tokio_test::assert_err!(client.send_transaction(BOB, "-1").await);
}
