//! Scripted provider and recording notifier for driving the polling loop offline.

use crate::{
    blockchain::{ChainDataProvider, ProviderError},
    models::{Block, BlockNumber, RawTransaction},
    notifier::{Notice, Notifier},
};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

pub fn raw_tx(hash: &str, value: &str) -> RawTransaction {
    RawTransaction {
        hash: hash.to_string(),
        from: "0x1111111111111111111111111111111111111111".to_string(),
        to: Some("0x2222222222222222222222222222222222222222".to_string()),
        value: Some(json!(value)),
    }
}

pub fn ether_hex(ether: u128) -> String {
    format!("{:#x}", ether * WEI_PER_ETHER)
}

/// Replays a fixed list of head responses; blocks default to empty.
#[derive(Default)]
pub struct ScriptedProvider {
    heads: Mutex<VecDeque<Result<BlockNumber, ProviderError>>>,
    blocks: Mutex<HashMap<BlockNumber, VecDeque<Result<Block, ProviderError>>>>,
    head_calls: Mutex<usize>,
    block_calls: Mutex<Vec<BlockNumber>>,
    /// Cancelled once the head script runs dry.
    on_exhausted: Option<CancellationToken>,
}

impl ScriptedProvider {
    pub fn new(heads: Vec<Result<BlockNumber, ProviderError>>) -> Self {
        Self {
            heads: Mutex::new(heads.into()),
            ..Default::default()
        }
    }

    pub fn cancel_when_exhausted(mut self, token: CancellationToken) -> Self {
        self.on_exhausted = Some(token);
        self
    }

    pub fn with_block_responses(
        self,
        number: BlockNumber,
        responses: Vec<Result<Block, ProviderError>>,
    ) -> Self {
        self.blocks.lock().unwrap().insert(number, responses.into());
        self
    }

    pub fn head_calls(&self) -> usize {
        *self.head_calls.lock().unwrap()
    }

    pub fn block_calls(&self) -> Vec<BlockNumber> {
        self.block_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainDataProvider for ScriptedProvider {
    async fn latest_block_number(&self) -> Result<BlockNumber, ProviderError> {
        *self.head_calls.lock().unwrap() += 1;
        let next = self.heads.lock().unwrap().pop_front();
        match next {
            Some(response) => response,
            None => {
                if let Some(token) = &self.on_exhausted {
                    token.cancel();
                }
                Err(ProviderError::Unavailable("script exhausted".to_string()))
            }
        }
    }

    async fn block_transactions(&self, block: BlockNumber) -> Result<Block, ProviderError> {
        self.block_calls.lock().unwrap().push(block);
        let scripted = self
            .blocks
            .lock()
            .unwrap()
            .get_mut(&block)
            .and_then(|responses| responses.pop_front());
        scripted.unwrap_or_else(|| Ok(Block::new(block, Vec::new())))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn whale_hashes(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Whale(alert) => Some(alert.transaction.hash),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}
