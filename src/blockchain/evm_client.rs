// src/blockchain/evm_client.rs

use crate::blockchain::{
    abi,
    client::FaucetContract,
    models::{ContractError, FaucetCall, RawClaimTimeValue, ReceiptStatus},
    nonce_manager::NonceManager,
};
use crate::config::Config;
use async_trait::async_trait;
use ethers_core::types::{Address, TransactionRequest, U256};
use ethers_signers::{LocalWallet, Signer};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

/// Faucet contract client speaking raw JSON-RPC to an EVM node.
#[derive(Clone)]
pub struct EvmFaucetClient {
    client: Client,
    rpc_url: String,
    chain_id: u64,
    contract: Address,
    wallet: Option<LocalWallet>,
    nonce_manager: NonceManager,
    wait_for_receipt: bool,
    receipt_timeout: Duration,
    receipt_poll_interval: Duration,
    gas_limit: Option<u64>,
}

impl EvmFaucetClient {
    pub fn new(config: &Config) -> Result<Self, ContractError> {
        let contract = Address::from_str(&config.faucet_contract_address).map_err(|e| {
            ContractError::InvalidArgument(format!("faucet contract address: {}", e))
        })?;

        let wallet = match config.faucet_private_key.as_ref() {
            Some(key) => {
                let wallet = LocalWallet::from_str(key.expose_secret().trim())
                    .map_err(|e| ContractError::InvalidArgument(format!("Invalid private key: {}", e)))?
                    .with_chain_id(config.chain_id);
                info!("Faucet signer loaded: {:?}", wallet.address());
                Some(wallet)
            }
            None => {
                warn!("FAUCET_PRIVATE_KEY not set; write tools are disabled");
                None
            }
        };

        Ok(Self {
            client: Client::new(),
            rpc_url: config.rpc_url.clone(),
            chain_id: config.chain_id,
            contract,
            wallet,
            nonce_manager: NonceManager::new(),
            wait_for_receipt: config.wait_for_receipt,
            receipt_timeout: config.receipt_timeout,
            receipt_poll_interval: config.receipt_poll_interval,
            gas_limit: config.gas_limit,
        })
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value, ContractError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        debug!("RPC {} -> {}", method, self.rpc_url);
        let resp: Value = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;
        if let Some(err) = resp.get("error") {
            return Err(ContractError::Rpc(rpc_error_message(err)));
        }
        Ok(resp["result"].clone())
    }

    async fn rpc_u256(&self, method: &str, params: Value) -> Result<U256, ContractError> {
        let result = self.rpc(method, params).await?;
        let hex_str = result
            .as_str()
            .ok_or_else(|| ContractError::Decode(format!("{} returned {}", method, result)))?;
        U256::from_str_radix(hex_str.trim_start_matches("0x"), 16)
            .map_err(|e| ContractError::Decode(e.to_string()))
    }

    async fn sign_and_send(&self, wallet: &LocalWallet, call: &FaucetCall) -> Result<String, ContractError> {
        let from = wallet.address();
        let data = abi::encode_call(call)?;
        let mut tx = TransactionRequest::new()
            .from(from)
            .to(self.contract)
            .data(data)
            .chain_id(self.chain_id);

        // Reverts such as the faucet cooldown surface here, before anything is signed.
        let gas = match self.gas_limit {
            Some(limit) => U256::from(limit),
            None => {
                let call_obj =
                    serde_json::to_value(&tx).map_err(|e| ContractError::Decode(e.to_string()))?;
                self.rpc_u256("eth_estimateGas", json!([call_obj])).await?
            }
        };
        let gas_price = self.rpc_u256("eth_gasPrice", json!([])).await?;
        let nonce = self
            .nonce_manager
            .get_next_nonce(&self.client, from, &self.rpc_url)
            .await?;
        tx = tx.gas(gas).gas_price(gas_price).nonce(nonce);

        // The nonce is reserved at this point; release it if signing or broadcast fails.
        match self.sign_and_broadcast(wallet, &tx).await {
            Ok(hash) => Ok(hash),
            Err(e) => {
                self.nonce_manager.reset(from).await;
                Err(e)
            }
        }
    }

    async fn sign_and_broadcast(
        &self,
        wallet: &LocalWallet,
        tx: &TransactionRequest,
    ) -> Result<String, ContractError> {
        let signature = wallet
            .sign_transaction(&tx.clone().into())
            .await
            .map_err(|e| ContractError::InvalidArgument(format!("signing failed: {}", e)))?;
        let raw_tx = tx.rlp_signed(&signature);

        let result = self
            .rpc(
                "eth_sendRawTransaction",
                json!([format!("0x{}", hex::encode(raw_tx))]),
            )
            .await?;

        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ContractError::Decode("Failed to extract transaction hash from response".into()))
    }
}

#[async_trait]
impl FaucetContract for EvmFaucetClient {
    fn can_sign(&self) -> bool {
        self.wallet.is_some()
    }

    async fn send_transaction(&self, call: FaucetCall) -> Result<String, ContractError> {
        let wallet = self.wallet.as_ref().ok_or(ContractError::SignerUnavailable)?;
        info!("Sending {} to faucet {:?}", call.signature(), self.contract);
        match self.sign_and_send(wallet, &call).await {
            Ok(hash) => {
                info!("Sent {}: {}", call.signature(), hash);
                Ok(hash)
            }
            Err(e) => {
                error!("Transaction {} failed: {}", call.signature(), e);
                Err(e)
            }
        }
    }

    fn supports_receipts(&self) -> bool {
        self.wait_for_receipt
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<ReceiptStatus, ContractError> {
        let deadline = Instant::now() + self.receipt_timeout;
        loop {
            let receipt = self.rpc("eth_getTransactionReceipt", json!([tx_hash])).await?;
            if !receipt.is_null() {
                return parse_receipt_status(&receipt);
            }
            if Instant::now() >= deadline {
                return Err(ContractError::ReceiptTimeout(tx_hash.to_string()));
            }
            sleep(self.receipt_poll_interval).await;
        }
    }

    async fn read(&self, call: FaucetCall) -> Result<RawClaimTimeValue, ContractError> {
        let data = abi::encode_call(&call)?;
        let result = self
            .rpc(
                "eth_call",
                json!([
                    {"to": format!("{:?}", self.contract), "data": format!("0x{}", hex::encode(data))},
                    "latest"
                ]),
            )
            .await?;
        match result.as_str() {
            Some(hex_str) => abi::decode_uint_result(hex_str),
            None => Ok(RawClaimTimeValue::from(&result)),
        }
    }
}

/// Receipts report `status` as `0x1`/`0x0`; some nodes use plain text.
fn parse_receipt_status(receipt: &Value) -> Result<ReceiptStatus, ContractError> {
    match receipt.get("status") {
        Some(Value::String(s)) if s.starts_with("0x") => u64::from_str_radix(&s[2..], 16)
            .map(ReceiptStatus::Code)
            .map_err(|e| ContractError::Decode(format!("receipt status '{}': {}", s, e))),
        Some(Value::String(s)) => Ok(ReceiptStatus::Text(s.clone())),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(ReceiptStatus::Code)
            .ok_or_else(|| ContractError::Decode(format!("receipt status {}", n))),
        _ => Err(ContractError::Decode("receipt has no status field".into())),
    }
}

/// Pull the human readable part out of a JSON-RPC error object.
pub(crate) fn rpc_error_message(err: &Value) -> String {
    match err.get("message").and_then(|m| m.as_str()) {
        Some(msg) => msg.to_string(),
        None => err.to_string(),
    }
}
