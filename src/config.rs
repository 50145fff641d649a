// src/config.rs

use anyhow::{Context, Result};
use secrecy::SecretString;
use std::env;
use std::time::Duration;

/// Celo mainnet, where the faucet contract is deployed by default.
pub const DEFAULT_CHAIN_ID: u64 = 42220;

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,

    // Chain settings
    pub rpc_url: String,
    pub chain_id: u64,
    pub faucet_contract_address: String,

    /// Private key of the wallet that signs claim/fund/withdraw transactions.
    /// Read-only tools keep working without it.
    pub faucet_private_key: Option<SecretString>,

    // Transaction settings
    pub wait_for_receipt: bool,
    pub receipt_timeout: Duration,
    pub receipt_poll_interval: Duration,
    pub gas_limit: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            faucet_contract_address: "0x0000000000000000000000000000000000000000".to_string(),
            faucet_private_key: None,
            wait_for_receipt: true,
            receipt_timeout: Duration::from_secs(60),
            receipt_poll_interval: Duration::from_millis(1000),
            gas_limit: None,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let rpc_url = env::var("FAUCET_RPC_URL").context("FAUCET_RPC_URL must be set")?;
        url::Url::parse(&rpc_url).context("FAUCET_RPC_URL must be a valid URL")?;

        let faucet_contract_address = env::var("FAUCET_CONTRACT_ADDRESS")
            .context("FAUCET_CONTRACT_ADDRESS must be set")?;
        anyhow::ensure!(
            crate::blockchain::models::ADDRESS_RE.is_match(&faucet_contract_address),
            "FAUCET_CONTRACT_ADDRESS must be a 0x-prefixed 20 byte hex address"
        );

        let gas_limit = match env::var("DEFAULT_GAS_LIMIT") {
            Ok(v) => Some(v.parse().context("DEFAULT_GAS_LIMIT must be a valid number")?),
            Err(_) => None,
        };

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,

            rpc_url,
            chain_id: env::var("FAUCET_CHAIN_ID")
                .unwrap_or_else(|_| DEFAULT_CHAIN_ID.to_string())
                .parse()
                .context("FAUCET_CHAIN_ID must be a valid number")?,
            faucet_contract_address,
            faucet_private_key: env::var("FAUCET_PRIVATE_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::new),

            wait_for_receipt: parse_bool(env::var("WAIT_FOR_RECEIPT").ok().as_deref(), true),
            receipt_timeout: Duration::from_secs(
                env::var("RECEIPT_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .context("RECEIPT_TIMEOUT_SECS must be a valid number")?,
            ),
            receipt_poll_interval: Duration::from_millis(
                env::var("RECEIPT_POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .context("RECEIPT_POLL_INTERVAL_MS must be a valid number")?,
            ),
            gas_limit,
        })
    }
}

fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_lowercase()) {
        Some(v) if v == "1" || v == "true" || v == "yes" => true,
        Some(v) if v == "0" || v == "false" || v == "no" => false,
        _ => default,
    }
}
