// src/lib.rs

use std::sync::Arc;

// Re-export commonly used types
pub use ethers::types::{Address, U256};

pub mod api;
pub mod blockchain;
pub mod config;
pub mod mcp;
pub mod utils;

use blockchain::{client::FaucetContract, services::faucet::FaucetService};

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Faucet tools backed by the configured contract client
    pub faucet: FaucetService,
}

impl AppState {
    pub fn new(config: config::Config, contract: Arc<dyn FaucetContract>) -> Self {
        Self {
            config,
            faucet: FaucetService::new(contract),
        }
    }
}
