//! Command gate and access policy for the FIR Ledger.
//!
//! Every registry command passes through the [`CommandGate`] before it can
//! append to the ledger or the pending queue. The gate runs a fail-fast
//! pipeline of stages (capability, then validation) and produces an
//! accept/reject decision with per-stage results.
//!
//! Reads go through [`AccessPolicy`], which partitions reconstructed case
//! state into what an actor can and cannot open.
//!
//! # Quick Start
//!
//! ```rust
//! use fir_gate::{Action, CommandGate, CommandRequest, GateConfig};
//! use fir_types::Identity;
//!
//! let gate = CommandGate::with_default_stages(GateConfig::default());
//! let officer = Identity::sub_inspector("si_state", "State Police");
//! let request = CommandRequest::new(officer, Action::RegisterCase)
//!     .with_input("case_id", "FIR-101/2024");
//! assert!(gate.evaluate(&request).unwrap().is_accepted());
//! ```

pub mod action;
pub mod config;
pub mod error;
pub mod gate;
pub mod stage;
pub mod stages;
pub mod visibility;

pub use action::Action;
pub use config::{CapabilityTable, GateConfig};
pub use error::GateError;
pub use gate::{CommandGate, Decision, GateResult};
pub use stage::{CommandRequest, GateContext, GateStage, StageDecision, StageResult};
pub use stages::capability::CapabilityStage;
pub use stages::validation::ValidationStage;
pub use visibility::{Access, AccessPolicy, OtherCase, VisibleCase, Visibility};
