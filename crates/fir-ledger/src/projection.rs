use std::sync::Arc;

use fir_types::{BlockHash, Timestamp};
use serde::Serialize;

use crate::block::Block;
use crate::error::LedgerError;
use crate::records::{
    AccessGrantRecord, BlockTag, EvidenceRecord, FirRecord, Payload, TransferRecord,
};
use crate::traits::LedgerReader;

/// Chronological history of one case: the FIR block plus every block that
/// references it by hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaseTimeline {
    pub fir_block: Arc<Block>,
    /// Referencing blocks, stably sorted by timestamp.
    pub events: Vec<Arc<Block>>,
}

impl CaseTimeline {
    pub fn fir_hash(&self) -> BlockHash {
        self.fir_block.hash
    }

    /// FIR block first, then events.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Block>> + '_ {
        std::iter::once(&self.fir_block).chain(self.events.iter())
    }
}

/// Row in the audit index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditIndexEntry {
    pub index: usize,
    pub hash: BlockHash,
    pub block_type: String,
    pub timestamp: Timestamp,
    pub summary: String,
}

/// Deterministic projection builders.
pub struct ProjectionBuilder;

impl ProjectionBuilder {
    /// Build the timeline of the case opened by `fir_hash`.
    ///
    /// Matching is on the raw `linked_fir_hash` / `fir_hash` field, so a
    /// block whose other fields are incomplete still shows up here.
    pub fn case_timeline<R: LedgerReader>(
        reader: &R,
        fir_hash: &BlockHash,
    ) -> Result<CaseTimeline, LedgerError> {
        let fir_block = match reader.find(fir_hash) {
            Some((_, block)) if block.payload.is(BlockTag::Fir) => Arc::clone(block),
            _ => return Err(LedgerError::CaseNotFound(*fir_hash)),
        };

        let target = fir_hash.to_hex();
        let mut events: Vec<Arc<Block>> = reader
            .blocks()
            .iter()
            .filter(|block| block.hash != *fir_hash && references(&block.payload, &target))
            .cloned()
            .collect();
        events.sort_by_key(|block| block.timestamp);

        Ok(CaseTimeline { fir_block, events })
    }

    /// One summary row per block, in ledger order.
    pub fn audit_index<R: LedgerReader>(reader: &R) -> Vec<AuditIndexEntry> {
        reader
            .blocks()
            .iter()
            .enumerate()
            .map(|(index, block)| AuditIndexEntry {
                index,
                hash: block.hash,
                block_type: block.payload.block_type.clone(),
                timestamp: block.timestamp,
                summary: summarize(block),
            })
            .collect()
    }
}

fn references(payload: &Payload, target: &str) -> bool {
    ["linked_fir_hash", "fir_hash"]
        .iter()
        .any(|field| payload.field_str(field) == Some(target))
}

fn summarize(block: &Block) -> String {
    match block.tag() {
        Some(BlockTag::Genesis) => "genesis".into(),
        Some(BlockTag::Fir) => match block.record::<FirRecord>() {
            Some(fir) => format!(
                "case {} registered by {} ({})",
                display_or_dash(&fir.case_id),
                fir.owner,
                fir.department
            ),
            None => "malformed FIR".into(),
        },
        Some(BlockTag::Evidence) => match block.record::<EvidenceRecord>() {
            Some(evidence) => format!(
                "{} evidence for {} by {}",
                display_or_dash(&evidence.evidence_type),
                evidence.linked_fir_hash.short_hex(),
                display_or_dash(&evidence.added_by_user)
            ),
            None => "malformed evidence".into(),
        },
        Some(BlockTag::AccessGrant) => match block.record::<AccessGrantRecord>() {
            Some(grant) => format!(
                "{} granted access to {}",
                grant.requester_dept,
                grant.fir_hash.short_hex()
            ),
            None => "malformed access grant".into(),
        },
        Some(BlockTag::TransferOwnership) => match block.record::<TransferRecord>() {
            Some(transfer) => format!(
                "{} transferred to {} ({})",
                transfer.fir_hash.short_hex(),
                transfer.new_officer_username,
                transfer.new_dept
            ),
            None => "malformed transfer".into(),
        },
        None => format!("{} field(s)", block.payload.fields.len()),
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
