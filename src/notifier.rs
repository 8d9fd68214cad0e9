use crate::models::{BlockNumber, WhaleAlert};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

/// Operator-facing events emitted by the polling loop.
#[derive(Debug, Clone)]
pub enum Notice {
    Connected { head: BlockNumber },
    Scanning { block: BlockNumber },
    Whale(WhaleAlert),
    NoWhales { block: BlockNumber, threshold: Decimal },
    Stopped { last_scanned: BlockNumber },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &Notice);
}

/// Prints notices to stdout for a human watching the terminal.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    explorer_tx_url: String,
}

impl ConsoleNotifier {
    pub fn new(explorer_tx_url: impl Into<String>) -> Self {
        Self {
            explorer_tx_url: explorer_tx_url.into(),
        }
    }

    pub fn render(&self, notice: &Notice) -> String {
        match notice {
            Notice::Connected { head } => format!(
                "✅ Connected! Most recent block: {}\nBeginning monitoring (Press Ctrl+C to stop)...\n",
                head
            ),
            Notice::Scanning { block } => format!("📦 Block {} mined. Scanning transactions...", block),
            Notice::Whale(alert) => {
                let tx = &alert.transaction;
                format!(
                    "\n🚨 WHALE ALERT! {:.2} ETH moved!\n   From: {}\n   To:   {}\n   Tx:   {}{}\n   Seen: {}",
                    alert.display_value,
                    tx.from,
                    tx.to.as_deref().unwrap_or("(contract creation)"),
                    self.explorer_tx_url,
                    tx.hash,
                    alert.detected_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Notice::NoWhales { threshold, .. } => {
                format!("   (No transactions >= {} ETH found in this block)", threshold)
            }
            Notice::Stopped { .. } => "\n🛑 Surveillance stopped by user.".to_string(),
        }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notice: &Notice) {
        println!("{}", self.render(notice));
        if let Notice::Whale(alert) = notice {
            info!(
                "Whale alert in block {}: {} ETH, tx {}",
                alert.block_number, alert.display_value, alert.transaction.hash
            );
        }
    }
}
