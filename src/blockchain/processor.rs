use crate::blockchain::models::TransactionError;
use crate::blockchain::units::ValueConverter;
use crate::models::{Block, RawTransaction, WhaleAlert};
use rust_decimal::Decimal;
use tracing::debug;

/// Outcome of checking one transaction against the threshold.
#[derive(Debug)]
pub enum TransactionVerdict {
    Whale(WhaleAlert),
    BelowThreshold,
    Malformed(TransactionError),
}

/// Picks the transactions of a block that move at least `threshold` display units.
#[derive(Debug, Clone)]
pub struct WhaleDetector {
    converter: ValueConverter,
    threshold: Decimal,
    /// `threshold` in base units, so the comparison is exact.
    threshold_base: Option<u128>,
}

impl WhaleDetector {
    pub fn new(threshold: Decimal) -> Self {
        Self::with_converter(threshold, ValueConverter::default())
    }

    pub fn with_converter(threshold: Decimal, converter: ValueConverter) -> Self {
        Self {
            converter,
            threshold,
            threshold_base: converter.to_base_units_ceil(threshold),
        }
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    pub fn evaluate(&self, block_number: u64, raw: &RawTransaction) -> TransactionVerdict {
        let transaction = match raw.decode() {
            Ok(tx) => tx,
            Err(e) => return TransactionVerdict::Malformed(e),
        };

        match self.threshold_base {
            Some(min) if transaction.value >= min => {
                let display_value = self.converter.to_display_units(transaction.value);
                TransactionVerdict::Whale(WhaleAlert::new(block_number, transaction, display_value))
            }
            _ => TransactionVerdict::BelowThreshold,
        }
    }

    /// Alerts for `block`, in transaction order. Malformed records are skipped.
    pub fn scan(&self, block: &Block) -> Vec<WhaleAlert> {
        block
            .transactions
            .iter()
            .filter_map(|raw| match self.evaluate(block.number, raw) {
                TransactionVerdict::Whale(alert) => Some(alert),
                TransactionVerdict::BelowThreshold => None,
                TransactionVerdict::Malformed(e) => {
                    debug!("Skipping transaction in block {}: {}", block.number, e);
                    None
                }
            })
            .collect()
    }
}
