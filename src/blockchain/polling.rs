use crate::blockchain::processor::WhaleDetector;
use crate::blockchain::provider::{ChainDataProvider, ProviderError};
use crate::models::{BlockNumber, Cursor};
use crate::notifier::{Notice, Notifier};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingSettings {
    /// Wait in `Idle` before asking for the head again.
    pub poll_interval: Duration,
    /// Delay after the provider throttled us.
    pub rate_limit_backoff: Duration,
    /// Delay after a transport failure, timeout or unreadable response.
    pub network_backoff: Duration,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(4),
            rate_limit_backoff: Duration::from_secs(2),
            network_backoff: Duration::from_secs(5),
        }
    }
}

/// States of the polling loop once it holds a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Scanning(BlockNumber),
    Backoff(Duration),
    Stopped,
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Failed to fetch the initial block number: {0}")]
    InitialHead(#[source] ProviderError),
}

/// Polls the provider for new blocks and reports whale transfers, one block at a time.
pub struct PollingLoop<P, N> {
    provider: P,
    notifier: N,
    detector: WhaleDetector,
    settings: PollingSettings,
    cursor: Cursor,
    /// Last block a scan notice was printed for; retries stay quiet.
    announced: Option<BlockNumber>,
}

impl<P, N> PollingLoop<P, N>
where
    P: ChainDataProvider,
    N: Notifier,
{
    /// Fetch the current head once and start from there. Historical blocks are not scanned.
    pub async fn connect(
        provider: P,
        notifier: N,
        detector: WhaleDetector,
        settings: PollingSettings,
    ) -> Result<Self, StartupError> {
        let head = provider
            .latest_block_number()
            .await
            .map_err(StartupError::InitialHead)?;

        info!("Starting block polling from block {}", head);
        notifier.notify(&Notice::Connected { head }).await;

        Ok(Self {
            provider,
            notifier,
            detector,
            settings,
            cursor: Cursor::new(head),
            announced: None,
        })
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn backoff_for(&self, err: &ProviderError) -> LoopState {
        if err.is_rate_limited() {
            debug!("Provider rate limited us: {}", err);
            LoopState::Backoff(self.settings.rate_limit_backoff)
        } else {
            warn!("⚠️  {}", err);
            LoopState::Backoff(self.settings.network_backoff)
        }
    }

    /// Ask for the head and decide what to do next. Never scans more than one block ahead.
    pub async fn check_head(&mut self) -> LoopState {
        match self.provider.latest_block_number().await {
            Ok(head) => match self.cursor.next_block(head) {
                Some(next) => {
                    debug!("Head at {}, cursor at {}", head, self.cursor.last_scanned());
                    LoopState::Scanning(next)
                }
                None => LoopState::Idle,
            },
            Err(e) => self.backoff_for(&e),
        }
    }

    /// Fetch and scan `block`; the cursor moves only if the whole block was processed.
    pub async fn scan_block(&mut self, block: BlockNumber) -> LoopState {
        if self.announced == Some(block) {
            debug!("Retrying block {}", block);
        } else {
            self.announced = Some(block);
            self.notifier.notify(&Notice::Scanning { block }).await;
        }

        let fetched = match self.provider.block_transactions(block).await {
            Ok(fetched) => fetched,
            Err(ProviderError::BlockNotAvailable(n)) => {
                debug!("Block {} not indexed yet, retrying later", n);
                return LoopState::Backoff(self.settings.rate_limit_backoff);
            }
            Err(e) => return self.backoff_for(&e),
        };

        let alerts = self.detector.scan(&fetched);
        debug!(
            "Block {}: {} transactions, {} alerts",
            block,
            fetched.transactions.len(),
            alerts.len()
        );

        if alerts.is_empty() {
            self.notifier
                .notify(&Notice::NoWhales {
                    block,
                    threshold: self.detector.threshold(),
                })
                .await;
        }
        for alert in alerts {
            self.notifier.notify(&Notice::Whale(alert)).await;
        }

        if !self.cursor.advance_to(block) {
            error!(
                "Refusing to move cursor from {} to {}",
                self.cursor.last_scanned(),
                block
            );
        }
        LoopState::Idle
    }

    /// Sleep for `delay`; false if `shutdown` fired first.
    async fn pause(delay: Duration, shutdown: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => false,
            _ = sleep(delay) => true,
        }
    }

    /// Drive the loop until `shutdown` is cancelled. Failures never end it.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        let mut state = LoopState::Idle;

        loop {
            if shutdown.is_cancelled() {
                state = LoopState::Stopped;
            }

            state = match state {
                LoopState::Idle => {
                    if Self::pause(self.settings.poll_interval, &shutdown).await {
                        self.check_head().await
                    } else {
                        LoopState::Stopped
                    }
                }
                LoopState::Scanning(block) => self.scan_block(block).await,
                LoopState::Backoff(delay) => {
                    if Self::pause(delay, &shutdown).await {
                        LoopState::Idle
                    } else {
                        LoopState::Stopped
                    }
                }
                LoopState::Stopped => {
                    info!(
                        "Shutting down block polling at block {}",
                        self.cursor.last_scanned()
                    );
                    self.notifier
                        .notify(&Notice::Stopped {
                            last_scanned: self.cursor.last_scanned(),
                        })
                        .await;
                    break;
                }
            };
        }
    }
}
