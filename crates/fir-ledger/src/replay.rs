use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use fir_types::BlockHash;
use serde::Serialize;

use crate::block::Block;
use crate::pending::PendingRequestQueue;
use crate::records::{AccessGrantRecord, BlockTag, EvidenceRecord, FirRecord, TransferRecord};
use crate::snapshot::LedgerSnapshot;
use crate::traits::LedgerReader;

/// Current view of one case, derived from the ledger and the pending queue.
///
/// Never stored: every query rebuilds it from scratch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaseState {
    pub fir_hash: BlockHash,
    pub fir_block: Arc<Block>,
    pub fir: FirRecord,
    /// Position of the FIR block in the ledger.
    pub index: usize,
    /// Linked evidence blocks in ledger order.
    pub evidence: Vec<Arc<Block>>,
    pub current_owner_department: String,
    pub current_owner_username: String,
    pub granted_departments: BTreeSet<String>,
    pub pending_departments: BTreeSet<String>,
}

impl CaseState {
    fn seed(fir_block: &Arc<Block>, index: usize, fir: FirRecord) -> Self {
        Self {
            fir_hash: fir_block.hash,
            fir_block: Arc::clone(fir_block),
            current_owner_department: fir.department.clone(),
            current_owner_username: fir.owner.clone(),
            fir,
            index,
            evidence: Vec::new(),
            granted_departments: BTreeSet::new(),
            pending_departments: BTreeSet::new(),
        }
    }

    pub fn case_id(&self) -> &str {
        &self.fir.case_id
    }

    pub fn is_owned_by(&self, department: &str) -> bool {
        self.current_owner_department == department
    }

    pub fn is_granted_to(&self, department: &str) -> bool {
        self.granted_departments.contains(department)
    }

    pub fn is_pending_for(&self, department: &str) -> bool {
        self.pending_departments.contains(department)
    }
}

/// Counters describing what a replay did with each block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    pub evaluated_blocks: u64,
    /// Blocks whose payload lacked a field their pass needed.
    pub skipped_malformed: u64,
    /// Evidence, grants, and transfers naming a hash that is not a case.
    pub dropped_dangling: u64,
    pub pending_applied: u64,
}

/// Output of a full replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReplayResult {
    /// Cases keyed by FIR block hash.
    pub cases: BTreeMap<BlockHash, CaseState>,
    /// Every `EVIDENCE` block, linked or not, in ledger order.
    pub evidence_blocks: Vec<Arc<Block>>,
    /// Every `ACCESS_GRANT` block in ledger order.
    pub grant_blocks: Vec<Arc<Block>>,
    /// Every `TRANSFER_OWNERSHIP` block in ledger order.
    pub transfer_blocks: Vec<Arc<Block>>,
    pub stats: ReplayStats,
}

impl ReplayResult {
    pub fn case(&self, fir_hash: &BlockHash) -> Option<&CaseState> {
        self.cases.get(fir_hash)
    }
}

/// Deterministic case-state replay.
///
/// Three passes over the whole ledger in append order, then one over the
/// pending queue:
///
/// 1. every `FIR` block seeds a case;
/// 2. evidence, grants, and transfers are applied to known cases, in ledger
///    order (later transfers win, grants accumulate and are never reset);
/// 3. live pending requests mark their department as pending.
///
/// References to unknown cases are dropped silently and a block missing a
/// field is skipped for its pass only; neither aborts the replay.
pub struct StateReconstructor;

impl StateReconstructor {
    pub fn replay<R: LedgerReader>(reader: &R, pending: &PendingRequestQueue) -> ReplayResult {
        let blocks = reader.blocks();
        let mut stats = ReplayStats {
            evaluated_blocks: blocks.len() as u64,
            ..Default::default()
        };

        let mut cases = fir_pass(blocks, &mut stats);
        let mut result = ReplayResult {
            cases: BTreeMap::new(),
            evidence_blocks: Vec::new(),
            grant_blocks: Vec::new(),
            transfer_blocks: Vec::new(),
            stats: ReplayStats::default(),
        };
        linkage_pass(blocks, &mut cases, &mut result, &mut stats);
        pending_pass(pending, &mut cases, &mut stats);

        tracing::debug!(
            cases = cases.len(),
            evaluated = stats.evaluated_blocks,
            skipped = stats.skipped_malformed,
            dropped = stats.dropped_dangling,
            "ledger replayed"
        );

        result.cases = cases;
        result.stats = stats;
        result
    }

    pub fn replay_snapshot(snapshot: &LedgerSnapshot) -> ReplayResult {
        Self::replay(snapshot, snapshot.pending())
    }
}

fn fir_pass(blocks: &[Arc<Block>], stats: &mut ReplayStats) -> BTreeMap<BlockHash, CaseState> {
    let mut cases = BTreeMap::new();
    for (index, block) in blocks.iter().enumerate() {
        if block.tag() != Some(BlockTag::Fir) {
            continue;
        }
        match block.record::<FirRecord>() {
            Some(fir) => {
                cases.insert(block.hash, CaseState::seed(block, index, fir));
            }
            None => skip_malformed(block, index, stats),
        }
    }
    cases
}

fn linkage_pass(
    blocks: &[Arc<Block>],
    cases: &mut BTreeMap<BlockHash, CaseState>,
    result: &mut ReplayResult,
    stats: &mut ReplayStats,
) {
    for (index, block) in blocks.iter().enumerate() {
        match block.tag() {
            Some(BlockTag::Evidence) => {
                result.evidence_blocks.push(Arc::clone(block));
                let Some(evidence) = block.record::<EvidenceRecord>() else {
                    skip_malformed(block, index, stats);
                    continue;
                };
                match cases.get_mut(&evidence.linked_fir_hash) {
                    Some(case) => case.evidence.push(Arc::clone(block)),
                    None => drop_dangling(block, index, &evidence.linked_fir_hash, stats),
                }
            }
            Some(BlockTag::AccessGrant) => {
                result.grant_blocks.push(Arc::clone(block));
                let Some(grant) = block.record::<AccessGrantRecord>() else {
                    skip_malformed(block, index, stats);
                    continue;
                };
                match cases.get_mut(&grant.fir_hash) {
                    Some(case) => {
                        case.granted_departments.insert(grant.requester_dept);
                    }
                    None => drop_dangling(block, index, &grant.fir_hash, stats),
                }
            }
            Some(BlockTag::TransferOwnership) => {
                result.transfer_blocks.push(Arc::clone(block));
                let Some(transfer) = block.record::<TransferRecord>() else {
                    skip_malformed(block, index, stats);
                    continue;
                };
                match cases.get_mut(&transfer.fir_hash) {
                    Some(case) => {
                        case.current_owner_department = transfer.new_dept;
                        case.current_owner_username = transfer.new_officer_username;
                    }
                    None => drop_dangling(block, index, &transfer.fir_hash, stats),
                }
            }
            Some(BlockTag::Genesis) | Some(BlockTag::Fir) | None => {}
        }
    }
}

fn pending_pass(
    pending: &PendingRequestQueue,
    cases: &mut BTreeMap<BlockHash, CaseState>,
    stats: &mut ReplayStats,
) {
    for (fir_hash, case) in cases.iter_mut() {
        for request in pending.entries_for(*fir_hash) {
            case.pending_departments
                .insert(request.requester.department.clone());
            stats.pending_applied += 1;
        }
    }
}

fn skip_malformed(block: &Block, index: usize, stats: &mut ReplayStats) {
    stats.skipped_malformed += 1;
    tracing::debug!(
        index,
        hash = %block.hash,
        block_type = %block.payload.block_type,
        "skipping block with missing or malformed fields"
    );
}

fn drop_dangling(block: &Block, index: usize, target: &BlockHash, stats: &mut ReplayStats) {
    stats.dropped_dangling += 1;
    tracing::debug!(
        index,
        hash = %block.hash,
        target = %target,
        block_type = %block.payload.block_type,
        "dropping reference to unknown case"
    );
}
