//! Tests for the JSON-RPC faucet client against a mocked EVM node.
//!
//! Each test uses its own URL path on the shared mock server so mocks from
//! concurrently running tests never match each other's requests.

use mockito::{mock, Matcher, Mock};
use secrecy::SecretString;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use esusu_faucet_mcp::{
    blockchain::{
        client::{EvmFaucetClient, FaucetContract},
        models::{ClaimParameters, FaucetCall, RawClaimTimeValue, UserAddressParameters},
        nonce_manager::NonceManager,
        services::faucet::FaucetService,
    },
    config::Config,
    Address, U256,
};

const USER: &str = "0x4d4cC2E0c5cBC9737A0dEc28d7C2510E2BEF5A09";
const CONTRACT: &str = "0x00000000000000000000000000000000000FaCe7";
const TEST_KEY: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
const TX_HASH: &str = "0x5f1c3fbb0e4c1a1a6a9f7e7b43d2b0a1c6a7e8f9d0c1b2a3f4e5d6c7b8a9f0e1";

fn config(path: &str, signer: bool) -> Config {
    Config {
        rpc_url: format!("{}{}", mockito::server_url(), path),
        faucet_contract_address: CONTRACT.to_string(),
        faucet_private_key: signer.then(|| SecretString::new(TEST_KEY.to_string())),
        receipt_timeout: Duration::from_millis(0),
        receipt_poll_interval: Duration::from_millis(1),
        ..Config::default()
    }
}

fn rpc_mock(path: &str, method: &str, response: serde_json::Value) -> Mock {
    mock("POST", path)
        .match_body(Matcher::PartialJson(json!({ "method": method })))
        .with_header("content-type", "application/json")
        .with_body(response.to_string())
        .create()
}

fn result(value: serde_json::Value) -> serde_json::Value {
    json!({"jsonrpc": "2.0", "id": 1, "result": value})
}

fn uint_word(n: u64) -> serde_json::Value {
    json!(format!("0x{:064x}", n))
}

#[tokio::test]
async fn test_read_time_until_next_claim() {
    let path = "/read-cooldown";
    let _call = rpc_mock(path, "eth_call", result(uint_word(3661)));

    let client = EvmFaucetClient::new(&config(path, false)).unwrap();
    let raw = client
        .read(FaucetCall::GetTimeUntilNextClaim { user: USER.into() })
        .await
        .unwrap();
    assert_eq!(raw, RawClaimTimeValue::Integer(3661u64.into()));

    let faucet = FaucetService::new(Arc::new(client));
    let text = faucet
        .get_time_until_next_claim(UserAddressParameters {
            user_address: USER.into(),
        })
        .await;
    assert_eq!(text, "Time until next claim: 1h 1m 1s");
}

#[tokio::test]
async fn test_read_rpc_error_is_reported() {
    let path = "/read-error";
    let _call = rpc_mock(
        path,
        "eth_call",
        json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32000, "message": "header not found"}}),
    );

    let faucet = FaucetService::new(Arc::new(EvmFaucetClient::new(&config(path, false)).unwrap()));
    assert_eq!(
        faucet
            .get_time_until_next_claim(UserAddressParameters {
                user_address: USER.into()
            })
            .await,
        "Failed to get the next claim time."
    );
    assert_eq!(
        faucet.get_faucet_balance().await,
        "Error: Could not retrieve faucet balance. RPC error: header not found"
    );
}

#[tokio::test]
async fn test_claim_confirmed() {
    let path = "/claim-ok";
    let _gas = rpc_mock(path, "eth_estimateGas", result(json!("0x186a0")));
    let _price = rpc_mock(path, "eth_gasPrice", result(json!("0x3b9aca00")));
    let _nonce = rpc_mock(path, "eth_getTransactionCount", result(json!("0x7")));
    let _send = rpc_mock(path, "eth_sendRawTransaction", result(json!(TX_HASH)));
    let _receipt = rpc_mock(
        path,
        "eth_getTransactionReceipt",
        result(json!({"transactionHash": TX_HASH, "status": "0x1"})),
    );

    let client = EvmFaucetClient::new(&config(path, true)).unwrap();
    assert!(client.can_sign());
    let faucet = FaucetService::new(Arc::new(client));

    let text = faucet
        .claim_for_user(ClaimParameters {
            recipient: Some(USER.into()),
            amount: Some(10.0),
        })
        .await;
    assert_eq!(
        text,
        format!(
            "Successfully claimed tokens from the faucet for user {}. Transaction hash: {}",
            USER, TX_HASH
        )
    );
}

#[tokio::test]
async fn test_claim_cooldown_revert() {
    let path = "/claim-cooldown";
    let _gas = rpc_mock(
        path,
        "eth_estimateGas",
        json!({"jsonrpc": "2.0", "id": 1, "error": {"code": 3, "message": "execution reverted: Wait for cooldown"}}),
    );
    let _call = rpc_mock(path, "eth_call", result(uint_word(300)));

    let faucet = FaucetService::new(Arc::new(EvmFaucetClient::new(&config(path, true)).unwrap()));
    let text = faucet
        .claim_for_user(ClaimParameters {
            recipient: Some(USER.into()),
            amount: Some(1.0),
        })
        .await;
    assert_eq!(
        text,
        format!("The user {} cannot claim yet. Time until next claim: 0h 5m 0s", USER)
    );
}

#[tokio::test]
async fn test_claim_receipt_timeout_is_pending() {
    let path = "/claim-pending";
    let _gas = rpc_mock(path, "eth_estimateGas", result(json!("0x186a0")));
    let _price = rpc_mock(path, "eth_gasPrice", result(json!("0x3b9aca00")));
    let _nonce = rpc_mock(path, "eth_getTransactionCount", result(json!("0x0")));
    let _send = rpc_mock(path, "eth_sendRawTransaction", result(json!(TX_HASH)));
    let _receipt = rpc_mock(path, "eth_getTransactionReceipt", result(json!(null)));

    let faucet = FaucetService::new(Arc::new(EvmFaucetClient::new(&config(path, true)).unwrap()));
    let text = faucet
        .claim_for_user(ClaimParameters {
            recipient: Some(USER.into()),
            amount: None,
        })
        .await;
    assert!(
        text.starts_with(&format!("Transaction sent for {} (tx: {})", USER, TX_HASH)),
        "{}",
        text
    );
}

#[tokio::test]
async fn test_write_without_signer() {
    let client = EvmFaucetClient::new(&config("/no-signer", false)).unwrap();
    assert!(!client.can_sign());
    let err = client
        .send_transaction(FaucetCall::GetFaucetBalance)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "no signer configured for the faucet wallet");
}

#[tokio::test]
async fn test_nonce_manager_sequences_and_resets() {
    let path = "/nonce";
    let nonce_mock = mock("POST", path)
        .match_body(Matcher::PartialJson(json!({ "method": "eth_getTransactionCount" })))
        .with_header("content-type", "application/json")
        .with_body(result(json!("0x7")).to_string())
        .expect(2)
        .create();

    let rpc_url = format!("{}{}", mockito::server_url(), path);
    let http = reqwest::Client::new();
    let manager = NonceManager::new();
    let sender: Address = USER.parse().unwrap();

    assert_eq!(manager.get_next_nonce(&http, sender, &rpc_url).await.unwrap(), U256::from(7));
    assert_eq!(manager.get_next_nonce(&http, sender, &rpc_url).await.unwrap(), U256::from(8));

    manager.reset(sender).await;
    assert_eq!(manager.get_next_nonce(&http, sender, &rpc_url).await.unwrap(), U256::from(7));
    nonce_mock.assert();
}

#[tokio::test]
async fn test_failed_broadcast_releases_nonce() {
    let path = "/send-no-hash";
    let _gas = rpc_mock(path, "eth_estimateGas", result(json!("0x186a0")));
    let _price = rpc_mock(path, "eth_gasPrice", result(json!("0x3b9aca00")));
    let nonce_mock = mock("POST", path)
        .match_body(Matcher::PartialJson(json!({ "method": "eth_getTransactionCount" })))
        .with_header("content-type", "application/json")
        .with_body(result(json!("0x3")).to_string())
        .expect(2)
        .create();
    let _send = rpc_mock(path, "eth_sendRawTransaction", result(json!(null)));

    let client = EvmFaucetClient::new(&config(path, true)).unwrap();
    let call = FaucetCall::ClaimForUser {
        recipient: USER.into(),
        amount: 5,
    };

    // Each failed attempt must hand its nonce back, so the next one re-reads it from the node.
    for _ in 0..2 {
        let err = client.send_transaction(call.clone()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to extract transaction hash"), "{}", err);
    }
    nonce_mock.assert();
}
