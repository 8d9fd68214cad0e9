use crate::blockchain::models::{extract_block, extract_block_number};
use crate::blockchain::provider::{ChainDataProvider, ProviderError};
use crate::config::Config;
use crate::models::{Block, BlockNumber};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info};

/// Etherscan-compatible `module=proxy` client.
pub struct EtherscanClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    chain_id: u64,
    limiter: DefaultDirectRateLimiter,
}

impl EtherscanClient {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let timeout = Duration::from_secs(config.rpc_timeout_secs);

        info!(
            "Initializing Etherscan client with endpoint: {}, chain id: {}, rate limit: {}/s",
            config.api_url, config.chain_id, config.rpc_rate_limit
        );

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        let per_second = NonZeroU32::new(config.rpc_rate_limit).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            chain_id: config.chain_id,
            limiter,
        })
    }

    async fn proxy_call(&self, action: &str, extra: &[(&str, String)]) -> Result<Value, ProviderError> {
        self.limiter.until_ready().await;

        let chain_id = self.chain_id.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("chainid", chain_id.as_str()),
            ("module", "proxy"),
            ("action", action),
        ];
        params.extend(extra.iter().map(|(k, v)| (*k, v.as_str())));
        params.push(("apikey", self.api_key.as_str()));

        debug!("Calling provider action {}", action);

        let body = self
            .http
            .get(&self.api_url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        Ok(body)
    }
}

#[async_trait]
impl ChainDataProvider for EtherscanClient {
    async fn latest_block_number(&self) -> Result<BlockNumber, ProviderError> {
        let body = self.proxy_call("eth_blockNumber", &[]).await?;
        extract_block_number(&body)
    }

    async fn block_transactions(&self, block: BlockNumber) -> Result<Block, ProviderError> {
        let tag = format!("{:#x}", block);
        let body = self
            .proxy_call(
                "eth_getBlockByNumber",
                &[("tag", tag), ("boolean", "true".to_string())],
            )
            .await?;
        extract_block(block, &body)
    }
}
