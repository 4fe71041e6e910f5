//! High-level API for the FIR Ledger.
//!
//! [`CaseRegistry`] is the main entry point for applications embedding the
//! ledger: it owns the chain, the pending-request queue, and the command
//! gate, and exposes the case commands and per-actor views.
//!
//! ```rust
//! use fir_sdk::{CaseRegistry, EvidenceDraft, FirDraft, Identity, RegistryConfig};
//!
//! let mut config = RegistryConfig::default();
//! config.ledger.difficulty = 1;
//! let registry = CaseRegistry::new(config)?;
//!
//! let si = Identity::sub_inspector("si_state", "State Police");
//! let fir = registry.register_case(&si, FirDraft::new("FIR-101/2024"))?;
//! registry.attach_evidence(&si, EvidenceDraft::new(fir.hash.to_hex(), "CCTV export"))?;
//!
//! let overview = registry.cases(&si)?;
//! assert_eq!(overview.visibility.owned().count(), 1);
//! # Ok::<(), fir_sdk::RegistryError>(())
//! ```

pub mod config;
pub mod draft;
pub mod error;
pub mod registry;

pub use config::{ConfigError, RegistryConfig};
pub use draft::{EvidenceDraft, FirDraft};
pub use error::{RegistryError, RegistryResult};
pub use registry::{CaseOverview, CaseRegistry};

// Re-export key types
pub use fir_gate::{Access, Action, CapabilityTable, GateConfig, GateError, Visibility};
pub use fir_ledger::{
    AuditIndexEntry, Block, BlockTag, CaseState, CaseTimeline, LedgerConfig, LedgerError,
    LedgerReader, LedgerSnapshot, PendingRequest, ReplayResult, ValidationReport,
};
pub use fir_types::{BlockHash, Identity, RequestId, Role};
