// src/blockchain/models.rs
use ethers_core::types::U256;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use validator::Validate;

// --- Error types for contract operations ---

/// Errors surfaced by the wallet/contract client.
///
/// The `Display` output always carries the upstream message verbatim, since
/// callers match on revert reasons such as "Wait for cooldown".
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("no signer configured for the faucet wallet")]
    SignerUnavailable,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("timed out waiting for receipt of {0}")]
    ReceiptTimeout(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

// --- Raw read values ---

/// Untyped value handed back by a contract read, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawClaimTimeValue {
    Absent,
    Integer(U256),
    Number(f64),
    Text(String),
    /// An object wrapper carrying the real payload under `value`.
    Wrapped(Box<RawClaimTimeValue>),
    Other,
}

impl From<&Value> for RawClaimTimeValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => RawClaimTimeValue::Absent,
            Value::Number(n) => match n.as_u64() {
                Some(u) => RawClaimTimeValue::Integer(U256::from(u)),
                None => n
                    .as_f64()
                    .map(RawClaimTimeValue::Number)
                    .unwrap_or(RawClaimTimeValue::Other),
            },
            Value::String(s) => RawClaimTimeValue::Text(s.clone()),
            Value::Object(map) => match map.get("value") {
                Some(inner) => RawClaimTimeValue::Wrapped(Box::new(inner.into())),
                None => RawClaimTimeValue::Other,
            },
            Value::Bool(_) | Value::Array(_) => RawClaimTimeValue::Other,
        }
    }
}

impl std::fmt::Display for RawClaimTimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawClaimTimeValue::Absent => write!(f, "undefined"),
            RawClaimTimeValue::Integer(n) => write!(f, "{}", n),
            RawClaimTimeValue::Number(x) => write!(f, "{}", x),
            RawClaimTimeValue::Text(s) => write!(f, "{}", s),
            RawClaimTimeValue::Wrapped(inner) => write!(f, "{}", inner),
            RawClaimTimeValue::Other => write!(f, "[object]"),
        }
    }
}

/// Seconds until the next claim (or an epoch timestamp), once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedSeconds {
    Seconds(u64),
    Unknown,
}

// --- Claim submission and outcome ---

/// Status flag from a transaction receipt. Libraries report it either as
/// text (`"success"`) or as the numeric EVM status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptStatus {
    Text(String),
    Code(u64),
}

impl ReceiptStatus {
    pub fn is_success(&self) -> bool {
        match self {
            ReceiptStatus::Text(s) => s == "success",
            ReceiptStatus::Code(c) => *c == 1,
        }
    }
}

/// What came back from trying to submit a claim transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimSubmission {
    /// Transaction was accepted but no receipt could be obtained.
    Sent { tx_hash: String },
    Confirmed { tx_hash: String, status: ReceiptStatus },
    Errored { message: Option<String> },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Success { tx_hash: String },
    PendingConfirmation { tx_hash: String },
    CooldownRejected { recipient: String },
    Failed { reason: String, tx_hash: Option<String> },
}

// --- Contract calls ---

/// The faucet contract functions the tools can invoke.
#[derive(Debug, Clone, PartialEq)]
pub enum FaucetCall {
    ClaimForUser { recipient: String, amount: u8 },
    FundFaucet { amount: U256 },
    EmergencyWithdraw { amount: U256 },
    GetFaucetBalance,
    GetTimeUntilNextClaim { user: String },
}

impl FaucetCall {
    /// Solidity signature used to derive the 4-byte selector.
    pub fn signature(&self) -> &'static str {
        match self {
            FaucetCall::ClaimForUser { .. } => "claimForUser(address,uint256)",
            FaucetCall::FundFaucet { .. } => "fundFaucet(uint256)",
            FaucetCall::EmergencyWithdraw { .. } => "emergencyWithdraw(uint256)",
            FaucetCall::GetFaucetBalance => "getFaucetBalance()",
            FaucetCall::GetTimeUntilNextClaim { .. } => "getTimeUntilNextClaim(address)",
        }
    }
}

// --- Tool parameters ---

lazy_static! {
    pub static ref ADDRESS_RE: Regex = Regex::new(r"^0x[a-fA-F0-9]{40}$").unwrap();
}

/// Parameters for the claim tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ClaimParameters {
    /// Recipient address for AI claims
    #[validate(regex(path = "ADDRESS_RE", message = "Must be a valid address"))]
    #[serde(default)]
    pub recipient: Option<String>,
    /// Percentage amount to claim from the faucet (1-20%)
    #[validate(range(min = 1, max = 20, message = "Percentage must be between 1 and 20"))]
    #[serde(default)]
    pub amount: Option<f64>,
}

pub const WHOLE_PERCENTAGE_MESSAGE: &str = "Percentage must be a whole number";

impl ClaimParameters {
    /// Percentage to send on-chain, or `None` when the amount is fractional.
    /// A missing amount becomes 0 so the contract chooses the share.
    /// Range is checked by `validate`.
    pub fn percentage(&self) -> Option<u8> {
        match self.amount {
            None => Some(0),
            Some(a) if a.fract() == 0.0 => Some(a as u8),
            Some(_) => None,
        }
    }
}

/// Parameters for funding the faucet or withdrawing from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundParameters {
    /// Token amount in base units, as a decimal string
    #[serde(default)]
    pub amount: Option<String>,
}

impl FundParameters {
    pub fn parse_amount(&self) -> Result<Option<U256>, ContractError> {
        match self.amount.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => U256::from_dec_str(s)
                .map(Some)
                .map_err(|e| ContractError::InvalidArgument(format!("amount '{}': {}", s, e))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAddressParameters {
    /// The user's wallet address
    #[serde(rename = "userAddress", alias = "user_address", default)]
    pub user_address: String,
}

/// Collapse validator errors into a single readable sentence.
pub fn describe_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: invalid value", field),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}
