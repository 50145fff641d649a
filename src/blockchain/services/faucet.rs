// src/blockchain/services/faucet.rs

use crate::blockchain::{
    client::FaucetContract,
    models::{
        describe_validation_errors, ClaimOutcome, ClaimParameters, ClaimSubmission, ContractError,
        FaucetCall, FundParameters, RawClaimTimeValue, UserAddressParameters, WHOLE_PERCENTAGE_MESSAGE,
    },
    services::claim_status::{classify_and_format, classify_claim_attempt, normalize_seconds, render_outcome},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

pub const WALLET_NOT_INITIALIZED: &str =
    "Error: Wallet client is not initialized. Please ensure the plugin is configured.";

/// Agent-facing faucet tools. Every method resolves to a sentence the agent
/// can show to the user; errors never escape.
#[derive(Clone)]
pub struct FaucetService {
    contract: Arc<dyn FaucetContract>,
}

impl FaucetService {
    pub fn new(contract: Arc<dyn FaucetContract>) -> Self {
        Self { contract }
    }

    /// Claims a share of the faucet balance for `recipient`.
    pub async fn claim_for_user(&self, params: ClaimParameters) -> String {
        let recipient = match params.recipient.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => return "A recipient address must be provided to claim for a user.".to_string(),
        };
        if let Err(errors) = params.validate() {
            return format!("Invalid claim parameters: {}", describe_validation_errors(&errors));
        }
        let Some(amount) = params.percentage() else {
            return format!("Invalid claim parameters: amount: {}", WHOLE_PERCENTAGE_MESSAGE);
        };
        if !self.contract.can_sign() {
            return WALLET_NOT_INITIALIZED.to_string();
        }

        info!("Claiming from faucet for {}", recipient);
        let call = FaucetCall::ClaimForUser {
            recipient: recipient.clone(),
            amount,
        };
        let submission = self.submit_claim(call).await;
        let outcome = classify_claim_attempt(&recipient, submission);

        let next_claim = match &outcome {
            ClaimOutcome::CooldownRejected { recipient } => Some(
                self.get_time_until_next_claim(UserAddressParameters {
                    user_address: recipient.clone(),
                })
                .await,
            ),
            _ => None,
        };
        render_outcome(&recipient, &outcome, next_claim.as_deref())
    }

    async fn submit_claim(&self, call: FaucetCall) -> ClaimSubmission {
        let tx_hash = match self.contract.send_transaction(call).await {
            Ok(hash) => hash,
            Err(e) => {
                error!("Error claiming tokens for user: {}", e);
                return e.into();
            }
        };
        if tx_hash.is_empty() {
            return ClaimSubmission::Empty;
        }
        if !self.contract.supports_receipts() {
            return ClaimSubmission::Sent { tx_hash };
        }
        match self.contract.wait_for_receipt(&tx_hash).await {
            Ok(status) => ClaimSubmission::Confirmed { tx_hash, status },
            Err(e) => {
                // The hash is still useful to the user, so this is not a failure.
                warn!("Error waiting for receipt of {}: {}", tx_hash, e);
                ClaimSubmission::Sent { tx_hash }
            }
        }
    }

    /// Fund the faucet with `amount` token base units.
    pub async fn fund_faucet(&self, params: FundParameters) -> String {
        let amount = match params.parse_amount() {
            Ok(Some(a)) => a,
            Ok(None) => return "Amount is required".to_string(),
            Err(e) => return format!("Failed to fund faucet: {}", e),
        };
        if !self.contract.can_sign() {
            return "Error: Wallet client is not available for funding.".to_string();
        }
        match self.contract.send_transaction(FaucetCall::FundFaucet { amount }).await {
            Ok(hash) => hash,
            Err(e) => {
                error!("Error funding faucet: {}", e);
                format!("Failed to fund faucet: {}", e)
            }
        }
    }

    /// Owner-only withdrawal of `amount` token base units.
    pub async fn emergency_withdraw(&self, params: FundParameters) -> String {
        let amount = match params.parse_amount() {
            Ok(Some(a)) => a,
            Ok(None) => return "Amount is required".to_string(),
            Err(e) => return format!("Emergency withdraw failed: {}", e),
        };
        if !self.contract.can_sign() {
            return "Error: Wallet client is not available for emergency withdraw.".to_string();
        }
        match self
            .contract
            .send_transaction(FaucetCall::EmergencyWithdraw { amount })
            .await
        {
            Ok(hash) => hash,
            Err(e) => {
                error!("Error during emergency withdraw: {}", e);
                format!("Emergency withdraw failed: {}", e)
            }
        }
    }

    pub async fn get_faucet_balance(&self) -> String {
        match self.contract.read(FaucetCall::GetFaucetBalance).await {
            Ok(balance) => format!("The faucet balance is: {}", balance),
            Err(e) => {
                error!("Error getting faucet balance: {}", e);
                format!("Error: Could not retrieve faucet balance. {}", e)
            }
        }
    }

    pub async fn get_time_until_next_claim(&self, params: UserAddressParameters) -> String {
        let user = params.user_address.trim();
        if user.is_empty() {
            return "A user address must be provided to check the next claim time.".to_string();
        }
        let call = FaucetCall::GetTimeUntilNextClaim {
            user: user.to_string(),
        };
        match self.contract.read(call).await {
            Ok(raw) => {
                if raw == RawClaimTimeValue::Absent {
                    warn!("getTimeUntilNextClaim returned nothing for {}", user);
                }
                classify_and_format(normalize_seconds(&raw))
            }
            Err(e) => {
                error!("Error getting next claim time: {}", e);
                "Failed to get the next claim time.".to_string()
            }
        }
    }
}

impl From<ContractError> for ClaimSubmission {
    fn from(e: ContractError) -> Self {
        ClaimSubmission::Errored {
            message: Some(e.to_string()),
        }
    }
}
