// Domain records shared by the provider adapter, the detector and the polling loop.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type BlockNumber = u64;

/// A transaction exactly as the provider delivered it. Only `value` is decoded
/// later, so one bad record cannot poison the rest of the block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// A transaction whose value has been decoded into base units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    /// `None` for contract creation.
    pub to: Option<String>,
    pub value: u128,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub number: BlockNumber,
    pub transactions: Vec<RawTransaction>,
}

impl Block {
    pub fn new(number: BlockNumber, transactions: Vec<RawTransaction>) -> Self {
        Self { number, transactions }
    }
}

#[derive(Debug, Clone)]
pub struct WhaleAlert {
    pub block_number: BlockNumber,
    pub transaction: Transaction,
    pub display_value: Decimal,
    pub detected_at: DateTime<Utc>,
}

impl WhaleAlert {
    pub fn new(block_number: BlockNumber, transaction: Transaction, display_value: Decimal) -> Self {
        Self {
            block_number,
            transaction,
            display_value,
            detected_at: Utc::now(),
        }
    }
}

/// Last block number fully scanned. Only ever moves forward by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    last_scanned: BlockNumber,
}

impl Cursor {
    pub fn new(last_scanned: BlockNumber) -> Self {
        Self { last_scanned }
    }

    pub fn last_scanned(&self) -> BlockNumber {
        self.last_scanned
    }

    /// The one block the loop may scan next, if the head has moved past us.
    pub fn next_block(&self, head: BlockNumber) -> Option<BlockNumber> {
        if head > self.last_scanned {
            Some(self.last_scanned + 1)
        } else {
            None
        }
    }

    /// Mark `block` as scanned. Anything other than the immediate successor is ignored.
    pub fn advance_to(&mut self, block: BlockNumber) -> bool {
        if block == self.last_scanned + 1 {
            self.last_scanned = block;
            true
        } else {
            false
        }
    }
}
