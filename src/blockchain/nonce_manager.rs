// src/blockchain/nonce_manager.rs

use dashmap::DashMap;
use ethers_core::types::{Address, U256};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::blockchain::evm_client::rpc_error_message;
use crate::blockchain::models::ContractError;

// Tracks the next nonce per sender so concurrent claims don't collide.
#[derive(Debug, Clone, Default)]
pub struct NonceManager {
    nonces: Arc<DashMap<Address, Arc<Mutex<NonceState>>>>,
}

#[derive(Debug)]
struct NonceState {
    next_nonce: Option<U256>,
}

impl NonceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the next valid nonce for a given address.
    /// The first call per address fetches the pending count from the node;
    /// later calls hand out sequential values from the cache.
    pub async fn get_next_nonce(
        &self,
        client: &Client,
        address: Address,
        rpc_url: &str,
    ) -> Result<U256, ContractError> {
        let address_nonce_lock = self
            .nonces
            .entry(address)
            .or_insert_with(|| Arc::new(Mutex::new(NonceState { next_nonce: None })))
            .clone();

        let mut state = address_nonce_lock.lock().await;

        let nonce_to_use = match state.next_nonce {
            Some(nonce) => nonce,
            None => {
                let payload = serde_json::json!({
                    "jsonrpc": "2.0",
                    "method": "eth_getTransactionCount",
                    "params": [format!("{:?}", address), "pending"],
                    "id": 1
                });

                let resp: serde_json::Value = client
                    .post(rpc_url)
                    .json(&payload)
                    .send()
                    .await?
                    .json()
                    .await?;

                if let Some(err) = resp.get("error") {
                    return Err(ContractError::Rpc(rpc_error_message(err)));
                }
                let nonce_hex = resp["result"]
                    .as_str()
                    .ok_or_else(|| ContractError::Decode("missing nonce in RPC response".into()))?;
                U256::from_str_radix(nonce_hex.trim_start_matches("0x"), 16)
                    .map_err(|e| ContractError::Decode(e.to_string()))?
            }
        };

        state.next_nonce = Some(nonce_to_use + U256::one());

        Ok(nonce_to_use)
    }

    /// Forget the cached nonce so the next call re-reads it from the node.
    pub async fn reset(&self, address: Address) {
        let lock = self.nonces.get(&address).map(|e| e.value().clone());
        if let Some(lock) = lock {
            lock.lock().await.next_nonce = None;
        }
    }
}

