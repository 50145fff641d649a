// src/blockchain/abi.rs

use crate::blockchain::models::{ContractError, FaucetCall, RawClaimTimeValue};
use ethers_core::abi::{decode, encode, ParamType, Token};
use ethers_core::types::{Address, Bytes, U256};
use ethers_core::utils::keccak256;
use std::str::FromStr;

fn selector(sig: &str) -> [u8; 4] {
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&keccak256(sig.as_bytes())[0..4]);
    sel
}

fn parse_address(s: &str) -> Result<Address, ContractError> {
    Address::from_str(s).map_err(|e| ContractError::InvalidArgument(format!("address '{}': {}", s, e)))
}

/// ABI-encode a faucet call as calldata (selector followed by arguments).
pub fn encode_call(call: &FaucetCall) -> Result<Bytes, ContractError> {
    let tokens = match call {
        FaucetCall::ClaimForUser { recipient, amount } => vec![
            Token::Address(parse_address(recipient)?),
            Token::Uint(U256::from(*amount)),
        ],
        FaucetCall::FundFaucet { amount } | FaucetCall::EmergencyWithdraw { amount } => {
            vec![Token::Uint(*amount)]
        }
        FaucetCall::GetFaucetBalance => vec![],
        FaucetCall::GetTimeUntilNextClaim { user } => vec![Token::Address(parse_address(user)?)],
    };
    let mut out = selector(call.signature()).to_vec();
    out.append(&mut encode(&tokens));
    Ok(Bytes::from(out))
}

/// Decode an `eth_call` hex result holding a single `uint256`.
/// An empty result (`0x`) means the call returned nothing.
pub fn decode_uint_result(hex_result: &str) -> Result<RawClaimTimeValue, ContractError> {
    let s = hex_result.strip_prefix("0x").unwrap_or(hex_result);
    if s.is_empty() {
        return Ok(RawClaimTimeValue::Absent);
    }
    let bytes = hex::decode(s).map_err(|e| ContractError::Decode(e.to_string()))?;
    let tokens = decode(&[ParamType::Uint(256)], &bytes).map_err(|e| ContractError::Decode(e.to_string()))?;
    match tokens.into_iter().next() {
        Some(Token::Uint(n)) => Ok(RawClaimTimeValue::Integer(n)),
        _ => Ok(RawClaimTimeValue::Other),
    }
}
