use std::env;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use dotenvy::dotenv;
use log::info;
use once_cell::sync::OnceCell;

use crate::errors::EventChainError;

pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x36faD67F403546f6c2947579a27d03bDAfe77d1a";
pub const DEFAULT_RPC_URL: &str = "https://rpc.sepolia.mantle.xyz";
pub const DEFAULT_IPFS_GATEWAY_URL: &str = "https://ipfs.io/ipfs/";
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_BLOCK_POLL_INTERVAL_MS: u64 = 4_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub contract_address: Address,
    /// Endpoint handed to `ContractGateway` implementations. This crate never
    /// dials it itself.
    pub rpc_url: String,
    pub ipfs_gateway_url: String,
    pub pinata_jwt: Option<String>,
    pub mapbox_token: Option<String>,
    pub confirmation_timeout: Duration,
    pub block_poll_interval: Duration,
}

static INSTANCE: OnceCell<AppConfig> = OnceCell::new();

impl AppConfig {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, EventChainError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, EventChainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contract_address = lookup("CONTRACT_ADDRESS")
            .unwrap_or_else(|| DEFAULT_CONTRACT_ADDRESS.to_string());
        let contract_address = Address::from_str(contract_address.trim()).map_err(|e| {
            EventChainError::Validation(format!("Invalid CONTRACT_ADDRESS: {}", e))
        })?;

        let rpc_url = lookup("RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let ipfs_gateway_url =
            lookup("IPFS_GATEWAY_URL").unwrap_or_else(|| DEFAULT_IPFS_GATEWAY_URL.to_string());

        let confirmation_timeout_secs = parse_number(
            &lookup,
            "CONFIRMATION_TIMEOUT_SECS",
            DEFAULT_CONFIRMATION_TIMEOUT_SECS,
        )?;
        let block_poll_interval_ms = parse_number(
            &lookup,
            "BLOCK_POLL_INTERVAL_MS",
            DEFAULT_BLOCK_POLL_INTERVAL_MS,
        )?;
        if block_poll_interval_ms == 0 {
            return Err(EventChainError::Validation(
                "BLOCK_POLL_INTERVAL_MS must be greater than 0".into(),
            ));
        }

        Ok(Self {
            contract_address,
            rpc_url,
            ipfs_gateway_url,
            pinata_jwt: lookup("PINATA_JWT").filter(|v| !v.trim().is_empty()),
            mapbox_token: lookup("MAPBOX_TOKEN").filter(|v| !v.trim().is_empty()),
            confirmation_timeout: Duration::from_secs(confirmation_timeout_secs),
            block_poll_interval: Duration::from_millis(block_poll_interval_ms),
        })
    }

    pub fn init_global() -> Result<&'static AppConfig, EventChainError> {
        INSTANCE.get_or_try_init(|| {
            let config = Self::from_env()?;
            info!(
                "Loaded config: contract={}, rpc={}",
                config.contract_address, config.rpc_url
            );
            Ok(config)
        })
    }

    pub fn global() -> Option<&'static AppConfig> {
        INSTANCE.get()
    }
}

fn parse_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64, EventChainError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| EventChainError::Validation(format!("{} must be a whole number", key))),
        None => Ok(default),
    }
}

/// Initialises `env_logger`, defaulting to `info` when `RUST_LOG` is unset.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
