// Manual smoke test against the live provider. Needs ETHERSCAN_API_KEY.

use whale_tracker::{
    blockchain::{ChainDataProvider, EtherscanClient, WhaleDetector},
    config::Config,
};
use std::time::Duration;
use tracing::{error, info, warn, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Starting provider integration test...");

    let config = Config::from_env(|| None)?;
    let client = EtherscanClient::new(&config)?;
    let detector = WhaleDetector::new(config.alert_threshold);

    // 1. Head height
    info!("Testing eth_blockNumber...");
    let head = client.latest_block_number().await?;
    info!("✅ Current head: {}", head);

    // 2. A few recent blocks
    for offset in 0..3u64 {
        let number = head.saturating_sub(offset);
        info!("Testing eth_getBlockByNumber for block {}...", number);

        match client.block_transactions(number).await {
            Ok(block) => {
                let alerts = detector.scan(&block);
                let malformed = block
                    .transactions
                    .iter()
                    .filter(|tx| tx.decode().is_err())
                    .count();
                info!(
                    "✅ Block {}: {} transactions, {} malformed, {} >= {} ETH",
                    number,
                    block.transactions.len(),
                    malformed,
                    alerts.len(),
                    detector.threshold()
                );
                for alert in alerts.iter().take(3) {
                    info!("   {} ETH in {}", alert.display_value, alert.transaction.hash);
                }
            }
            Err(e) if e.is_rate_limited() => warn!("Rate limited on block {}: {}", number, e),
            Err(e) => error!("❌ Failed to fetch block {}: {}", number, e),
        }

        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    // 3. A block beyond the head should not be available yet
    match client.block_transactions(head + 1_000).await {
        Ok(block) => warn!("Block {} unexpectedly returned {} transactions", block.number, block.transactions.len()),
        Err(e) => info!("✅ Future block rejected: {}", e),
    }

    info!("All provider checks completed!");
    Ok(())
}
