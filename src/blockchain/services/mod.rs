// src/blockchain/services/mod.rs

pub mod claim_status;
pub mod faucet;
