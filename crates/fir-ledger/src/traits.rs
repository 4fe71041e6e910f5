use std::sync::Arc;

use fir_types::BlockHash;

use crate::block::Block;

/// Read boundary for replay, projections, and validation.
///
/// Implemented by the live [`Ledger`](crate::Ledger) and by
/// [`LedgerSnapshot`](crate::LedgerSnapshot), so every read path works the
/// same whether or not the caller holds the write lock.
pub trait LedgerReader {
    /// All blocks in append order, genesis first.
    fn blocks(&self) -> &[Arc<Block>];

    fn block_count(&self) -> usize {
        self.blocks().len()
    }

    fn latest_block(&self) -> Option<&Arc<Block>> {
        self.blocks().last()
    }

    fn block_at(&self, index: usize) -> Option<&Arc<Block>> {
        self.blocks().get(index)
    }

    /// Locate a block by hash, returning its ledger index.
    fn find(&self, hash: &BlockHash) -> Option<(usize, &Arc<Block>)> {
        self.blocks()
            .iter()
            .enumerate()
            .find(|(_, block)| block.hash == *hash)
    }
}
