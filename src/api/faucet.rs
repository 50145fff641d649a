// src/api/faucet.rs

use crate::blockchain::models::{ClaimParameters, FundParameters, UserAddressParameters};
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

/// Body returned by every faucet endpoint: the same sentence the MCP tool gives.
#[derive(Debug, Serialize)]
pub struct FaucetMessage {
    pub message: String,
}

impl From<String> for FaucetMessage {
    fn from(message: String) -> Self {
        Self { message }
    }
}

pub async fn claim_handler(
    State(state): State<AppState>,
    Json(req): Json<ClaimParameters>,
) -> Json<FaucetMessage> {
    Json(state.faucet.claim_for_user(req).await.into())
}

pub async fn fund_handler(
    State(state): State<AppState>,
    Json(req): Json<FundParameters>,
) -> Json<FaucetMessage> {
    Json(state.faucet.fund_faucet(req).await.into())
}

pub async fn withdraw_handler(
    State(state): State<AppState>,
    Json(req): Json<FundParameters>,
) -> Json<FaucetMessage> {
    Json(state.faucet.emergency_withdraw(req).await.into())
}

pub async fn balance_handler(State(state): State<AppState>) -> Json<FaucetMessage> {
    Json(state.faucet.get_faucet_balance().await.into())
}

pub async fn next_claim_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<FaucetMessage> {
    let params = UserAddressParameters {
        user_address: address,
    };
    Json(state.faucet.get_time_until_next_claim(params).await.into())
}
