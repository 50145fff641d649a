//! Wallet/contract client boundary for the faucet.
//!
//! The tool layer only talks to the faucet contract through [`FaucetContract`],
//! so the JSON-RPC backed [`EvmFaucetClient`] can be swapped for an in-memory
//! implementation in tests.

use async_trait::async_trait;

pub use super::evm_client::EvmFaucetClient;
use crate::blockchain::models::{ContractError, FaucetCall, RawClaimTimeValue, ReceiptStatus};

#[async_trait]
pub trait FaucetContract: Send + Sync {
    /// Whether a signing wallet is configured for write calls.
    fn can_sign(&self) -> bool;

    /// Submit a state-changing call and return its transaction hash.
    async fn send_transaction(&self, call: FaucetCall) -> Result<String, ContractError>;

    /// Whether [`FaucetContract::wait_for_receipt`] is usable.
    fn supports_receipts(&self) -> bool;

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<ReceiptStatus, ContractError>;

    /// Perform a read-only call.
    async fn read(&self, call: FaucetCall) -> Result<RawClaimTimeValue, ContractError>;
}
