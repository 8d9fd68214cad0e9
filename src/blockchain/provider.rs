use crate::models::{Block, BlockNumber};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Block {0} is not available from the provider yet")]
    BlockNotAvailable(BlockNumber),
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            return ProviderError::RateLimited("HTTP 429 Too Many Requests".to_string());
        }

        // The request URL carries the API key in its query string.
        let timeout = err.is_timeout();
        let decode = err.is_decode();
        let err = err.without_url();

        if timeout {
            ProviderError::Unavailable(format!("request timed out: {}", err))
        } else if decode {
            ProviderError::MalformedResponse(err.to_string())
        } else {
            ProviderError::Unavailable(err.to_string())
        }
    }
}

/// Source of chain head height and block contents.
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    /// Current head height of the chain.
    async fn latest_block_number(&self) -> Result<BlockNumber, ProviderError>;

    /// All transactions of `block`, fetched in one piece.
    async fn block_transactions(&self, block: BlockNumber) -> Result<Block, ProviderError>;
}
