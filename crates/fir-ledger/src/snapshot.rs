use std::sync::Arc;

use crate::block::Block;
use crate::chain::Ledger;
use crate::pending::PendingRequestQueue;
use crate::traits::LedgerReader;

/// Point-in-time copy of the ledger and the pending overlay.
///
/// Taken while holding a read lock; replaying it afterwards needs no lock at
/// all. Blocks are shared `Arc`s, so a snapshot costs one pointer per block
/// plus a clone of the (small) pending queue.
#[derive(Clone, Debug)]
pub struct LedgerSnapshot {
    blocks: Vec<Arc<Block>>,
    pending: PendingRequestQueue,
}

impl LedgerSnapshot {
    pub fn capture(ledger: &Ledger, pending: &PendingRequestQueue) -> Self {
        Self {
            blocks: ledger.blocks().to_vec(),
            pending: pending.clone(),
        }
    }

    /// Assemble a snapshot from parts, e.g. a hand-built block list in tests.
    pub fn from_parts(blocks: Vec<Arc<Block>>, pending: PendingRequestQueue) -> Self {
        Self { blocks, pending }
    }

    pub fn pending(&self) -> &PendingRequestQueue {
        &self.pending
    }
}

impl LedgerReader for LedgerSnapshot {
    fn blocks(&self) -> &[Arc<Block>] {
        &self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::records::Payload;

    #[test]
    fn snapshot_is_isolated_from_later_appends() {
        let mut ledger = Ledger::new(LedgerConfig::with_difficulty(0)).unwrap();
        let queue = PendingRequestQueue::new();
        let snapshot = LedgerSnapshot::capture(&ledger, &queue);

        ledger.append(Payload::new("MEMO")).unwrap();

        assert_eq!(snapshot.block_count(), 1);
        assert_eq!(ledger.len(), 2);
        assert!(Arc::ptr_eq(&snapshot.blocks()[0], &ledger.blocks()[0]));
    }
}
