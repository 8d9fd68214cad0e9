pub mod blockchain;
pub mod config;
pub mod models;
pub mod notifier;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use blockchain::{ChainDataProvider, EtherscanClient, PollingLoop, ProviderError, WhaleDetector};
pub use config::{Config, ConfigError};
pub use models::{Block, BlockNumber, Cursor, RawTransaction, Transaction, WhaleAlert};
pub use notifier::{ConsoleNotifier, Notice, Notifier};
pub use validation::{mask_secret, validate_api_key, validate_threshold, ValidationError};
