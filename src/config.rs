// Runtime configuration, read once at startup and passed down explicitly:
// - provider endpoint, chain id and API key
// - alert threshold in ether
// - polling interval and the two backoff delays
// - request timeout and client-side request budget

use crate::blockchain::polling::PollingSettings;
use crate::validation::{self, mask_secret, ValidationError};
use dotenv::dotenv;
use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.etherscan.io/v2/api";
pub const DEFAULT_EXPLORER_TX_URL: &str = "https://etherscan.io/tx/";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API key is required: set ETHERSCAN_API_KEY or enter it when prompted")]
    ConfigurationMissing,

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    pub chain_id: u64,
    pub alert_threshold: Decimal,
    pub poll_interval_secs: u64,
    pub rate_limit_backoff_secs: u64,
    pub network_backoff_secs: u64,
    pub rpc_timeout_secs: u64,
    pub rpc_rate_limit: u32,
    pub explorer_tx_url: String,
}

// Keeps the API key out of `{:?}` output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("api_key", &mask_secret(&self.api_key))
            .field("chain_id", &self.chain_id)
            .field("alert_threshold", &self.alert_threshold)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("rate_limit_backoff_secs", &self.rate_limit_backoff_secs)
            .field("network_backoff_secs", &self.network_backoff_secs)
            .field("rpc_timeout_secs", &self.rpc_timeout_secs)
            .field("rpc_rate_limit", &self.rpc_rate_limit)
            .field("explorer_tx_url", &self.explorer_tx_url)
            .finish()
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        _ => Ok(default),
    }
}

impl Config {
    /// Read the process environment (after loading `.env`).
    ///
    /// `prompt_api_key` is consulted only when `ETHERSCAN_API_KEY` is unset or blank.
    pub fn from_env(prompt_api_key: impl FnOnce() -> Option<String>) -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok(), prompt_api_key)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        prompt_api_key: impl FnOnce() -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = lookup("ETHERSCAN_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .or_else(prompt_api_key)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::ConfigurationMissing)?;
        validation::validate_api_key(&api_key)?;

        let api_url = lookup("ETHERSCAN_API_URL")
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let explorer_tx_url = lookup("EXPLORER_TX_URL")
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EXPLORER_TX_URL.to_string());

        let chain_id = parse_or(&lookup, "CHAIN_ID", 1u64)?;
        let alert_threshold = parse_or(&lookup, "ALERT_THRESHOLD", Decimal::from(100))?;
        let poll_interval_secs = parse_or(&lookup, "POLL_INTERVAL_SECS", 4u64)?;
        let rate_limit_backoff_secs = parse_or(&lookup, "RATE_LIMIT_BACKOFF_SECS", 2u64)?;
        let network_backoff_secs = parse_or(&lookup, "NETWORK_BACKOFF_SECS", 5u64)?;
        let rpc_timeout_secs = parse_or(&lookup, "RPC_TIMEOUT_SECS", 10u64)?;
        let rpc_rate_limit = parse_or(&lookup, "RPC_RATE_LIMIT", 5u32)?;

        validation::validate_threshold(alert_threshold)?;
        validation::validate_backoff(
            Duration::from_secs(rate_limit_backoff_secs),
            Duration::from_secs(network_backoff_secs),
        )?;
        if rpc_rate_limit == 0 {
            return Err(ConfigError::InvalidValue {
                name: "RPC_RATE_LIMIT",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            api_url,
            api_key,
            chain_id,
            alert_threshold,
            poll_interval_secs,
            rate_limit_backoff_secs,
            network_backoff_secs,
            rpc_timeout_secs,
            rpc_rate_limit,
            explorer_tx_url,
        })
    }

    pub fn polling_settings(&self) -> PollingSettings {
        PollingSettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            rate_limit_backoff: Duration::from_secs(self.rate_limit_backoff_secs),
            network_backoff: Duration::from_secs(self.network_backoff_secs),
        }
    }
}
