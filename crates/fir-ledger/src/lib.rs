//! Append-only case ledger for the FIR Ledger.
//!
//! This crate is the heart of the system. It provides:
//! - Untyped block payloads with typed record views (FIR, evidence, grant, transfer)
//! - Mined, hash-linked [`Block`]s and the append-only [`Ledger`]
//! - The off-chain [`PendingRequestQueue`] of unresolved access requests
//! - Deterministic case-state replay ([`StateReconstructor`])
//! - Projection builders (case timeline, audit index)
//! - Full-chain validation (links, hashes, proof of work, timestamp order)

pub mod block;
pub mod chain;
pub mod config;
pub mod error;
pub mod pending;
pub mod projection;
pub mod records;
pub mod replay;
pub mod snapshot;
pub mod traits;
pub mod validation;

pub use block::Block;
pub use chain::Ledger;
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use pending::{PendingRequest, PendingRequestQueue};
pub use projection::{AuditIndexEntry, CaseTimeline, ProjectionBuilder};
pub use records::{
    AccessGrantRecord, BlockTag, EvidenceRecord, FirRecord, Payload, Record, TransferRecord,
};
pub use replay::{CaseState, ReplayResult, ReplayStats, StateReconstructor};
pub use snapshot::LedgerSnapshot;
pub use traits::LedgerReader;
pub use validation::{ChainValidator, ValidationReport, Violation, ViolationKind};
