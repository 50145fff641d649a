// src/blockchain/mod.rs

pub mod abi;
pub mod client;
pub use client::{EvmFaucetClient, FaucetContract};

pub mod evm_client;
pub mod models;
pub mod nonce_manager;
pub mod services;
