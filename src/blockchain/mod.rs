pub mod client;
pub mod models;
pub mod polling;
pub mod processor;
pub mod provider;
pub mod units;

// Re-exports for convenience
pub use client::EtherscanClient;
pub use polling::{LoopState, PollingLoop, PollingSettings, StartupError};
pub use processor::WhaleDetector;
pub use provider::{ChainDataProvider, ProviderError};
pub use units::ValueConverter;
