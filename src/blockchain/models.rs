use crate::blockchain::provider::ProviderError;
use crate::models::{Block, BlockNumber, RawTransaction, Transaction};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Etherscan's marker for a throttled request.
pub const RATE_LIMIT_MESSAGE: &str = "NOTOK";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("missing 0x prefix")]
    MissingPrefix,

    #[error("no digits after 0x")]
    Empty,

    #[error("invalid hex digit")]
    InvalidDigit,

    #[error("quantity does not fit in {0} bits")]
    Overflow(u32),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("transaction {hash} has no value")]
    MissingValue { hash: String },

    #[error("transaction {hash} has malformed value {raw}: {source}")]
    MalformedValue {
        hash: String,
        raw: String,
        #[source]
        source: HexError,
    },
}

#[derive(Debug, Deserialize)]
struct RpcBlock {
    #[serde(default)]
    transactions: Vec<RawTransaction>,
}

fn hex_digits(input: &str) -> Result<&str, HexError> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .ok_or(HexError::MissingPrefix)?;

    if digits.is_empty() {
        return Err(HexError::Empty);
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HexError::InvalidDigit);
    }
    Ok(digits)
}

/// Decode an Ethereum JSON-RPC hex quantity such as `"0x1a2b3c"`.
pub fn parse_hex_u128(input: &str) -> Result<u128, HexError> {
    let digits = hex_digits(input.trim())?;
    u128::from_str_radix(digits, 16).map_err(|_| HexError::Overflow(128))
}

pub fn parse_hex_u64(input: &str) -> Result<u64, HexError> {
    let digits = hex_digits(input.trim())?;
    u64::from_str_radix(digits, 16).map_err(|_| HexError::Overflow(64))
}

impl RawTransaction {
    /// Decode the value field into base units.
    pub fn decode(&self) -> Result<Transaction, TransactionError> {
        let raw = match &self.value {
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(TransactionError::MalformedValue {
                    hash: self.hash.clone(),
                    raw: other.to_string(),
                    source: HexError::MissingPrefix,
                })
            }
            None => {
                return Err(TransactionError::MissingValue {
                    hash: self.hash.clone(),
                })
            }
        };

        let value = parse_hex_u128(raw).map_err(|source| TransactionError::MalformedValue {
            hash: self.hash.clone(),
            raw: raw.clone(),
            source,
        })?;

        Ok(Transaction {
            hash: self.hash.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            value,
        })
    }
}

/// Validate the proxy envelope and hand back its `result` member.
fn envelope_result(body: &Value) -> Result<&Value, ProviderError> {
    // NOTOK wins over `result`: a throttled reply carries its reason in `result`.
    if body.get("message").and_then(Value::as_str) == Some(RATE_LIMIT_MESSAGE) {
        let reason = body
            .get("result")
            .and_then(Value::as_str)
            .unwrap_or("rate limit reached");
        return Err(ProviderError::RateLimited(reason.to_string()));
    }

    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown JSON-RPC error");
        return Err(ProviderError::Unavailable(message.to_string()));
    }

    body.get("result")
        .ok_or_else(|| ProviderError::MalformedResponse("response has no result field".to_string()))
}

/// Parse an `eth_blockNumber` reply.
pub fn extract_block_number(body: &Value) -> Result<BlockNumber, ProviderError> {
    let result = envelope_result(body)?;
    let hex = result.as_str().ok_or_else(|| {
        ProviderError::MalformedResponse(format!("block number is not a string: {}", result))
    })?;

    parse_hex_u64(hex)
        .map_err(|e| ProviderError::MalformedResponse(format!("block number {:?}: {}", hex, e)))
}

/// Parse an `eth_getBlockByNumber` reply requested with full transaction objects.
///
/// `result: null` means the provider has not indexed the block yet; an object
/// with an empty `transactions` array is a genuinely empty block.
pub fn extract_block(number: BlockNumber, body: &Value) -> Result<Block, ProviderError> {
    let result = envelope_result(body)?;

    match result {
        Value::Null => Err(ProviderError::BlockNotAvailable(number)),
        Value::Object(_) => {
            let block: RpcBlock = serde_json::from_value(result.clone()).map_err(|e| {
                ProviderError::MalformedResponse(format!("block {}: {}", number, e))
            })?;
            debug!("Block {} carries {} transactions", number, block.transactions.len());
            Ok(Block::new(number, block.transactions))
        }
        other => Err(ProviderError::MalformedResponse(format!(
            "block {} result is not an object: {}",
            number, other
        ))),
    }
}
