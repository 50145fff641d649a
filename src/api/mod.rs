//! # API Module
//!
//! HTTP handlers for the faucet server. Every faucet endpoint returns
//! `{"message": "..."}` carrying the same text the MCP tool would.
//!
//! ## Available Endpoints
//!
//! - `GET /health` - Liveness check
//! - `POST /faucet/claim` - Claim for a recipient (`{"recipient", "amount"}`)
//! - `POST /faucet/fund` - Fund the faucet (`{"amount"}`)
//! - `POST /faucet/withdraw` - Emergency withdraw (`{"amount"}`)
//! - `GET /faucet/balance` - Faucet balance
//! - `GET /faucet/next-claim/:address` - Cooldown left for an address
//! - `POST /rpc` - JSON-RPC (MCP) over HTTP

pub mod faucet;
pub mod health;
pub mod rpc;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the full application router, with every route nested under `/api`.
pub fn create_router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/faucet/claim", post(faucet::claim_handler))
        .route("/faucet/fund", post(faucet::fund_handler))
        .route("/faucet/withdraw", post(faucet::withdraw_handler))
        .route("/faucet/balance", get(faucet::balance_handler))
        .route("/faucet/next-claim/:address", get(faucet::next_claim_handler))
        .route("/rpc", post(rpc::rpc_handler));

    Router::new()
        .nest("/api", api_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
