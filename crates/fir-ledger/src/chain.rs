use std::sync::Arc;

use fir_crypto::{ChainError, HashChainVerifier};
use fir_types::{BlockHash, Timestamp};

use crate::block::Block;
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::records::Payload;
use crate::traits::LedgerReader;

/// Ordered, append-only sequence of mined blocks.
///
/// The ledger has no interior locking: `append` takes `&mut self`, so the
/// read-latest / mine / push sequence is atomic with respect to whatever
/// lock the owner wraps it in. Blocks are handed out as `Arc<Block>` and are
/// never mutated or removed once pushed.
#[derive(Debug)]
pub struct Ledger {
    config: LedgerConfig,
    blocks: Vec<Arc<Block>>,
}

impl Ledger {
    /// Create a ledger holding a freshly mined genesis block.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        let genesis = Block::new(Timestamp::now(), Payload::genesis(), BlockHash::zero())?
            .mine(config.difficulty)?;
        tracing::info!(
            hash = %genesis.hash,
            difficulty = config.difficulty,
            "genesis block mined"
        );
        Ok(Self {
            config,
            blocks: vec![Arc::new(genesis)],
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn difficulty(&self) -> usize {
        self.config.difficulty
    }

    /// The most recently appended block.
    pub fn latest(&self) -> Result<&Arc<Block>, LedgerError> {
        self.blocks.last().ok_or(LedgerError::EmptyLedger)
    }

    /// Link `payload` to the current tip, mine it, and append it.
    ///
    /// The timestamp never goes backwards relative to the tip.
    pub fn append(&mut self, payload: Payload) -> Result<Arc<Block>, LedgerError> {
        let latest = self.latest()?;
        let previous_hash = latest.hash;
        let timestamp = Timestamp::next_after(&latest.timestamp);

        let block = Block::new(timestamp, payload, previous_hash)?.mine(self.config.difficulty)?;
        let block = Arc::new(block);
        self.blocks.push(Arc::clone(&block));

        tracing::info!(
            index = self.blocks.len() - 1,
            hash = %block.hash,
            block_type = %block.payload.block_type,
            "block appended"
        );
        Ok(block)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Block>> {
        self.blocks.get(index)
    }

    /// Fail-fast integrity check of links and hashes.
    pub fn verify(&self) -> Result<(), ChainError> {
        HashChainVerifier::verify_chain(&self.blocks)
    }
}

impl LedgerReader for Ledger {
    fn blocks(&self) -> &[Arc<Block>] {
        &self.blocks
    }
}
