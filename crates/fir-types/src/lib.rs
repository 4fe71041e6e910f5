//! Foundation types for the FIR Ledger.
//!
//! Every other FIR Ledger crate depends on `fir-types`. Nothing in here knows
//! about blocks or replay; these are the identifiers and value types the rest
//! of the system passes around.
//!
//! # Key Types
//!
//! - [`BlockHash`]: 32-byte content hash of a sealed block, hex on the wire
//! - [`Timestamp`]: monotone wall-clock stamp with a logical tie-breaker
//! - [`Identity`] / [`Role`]: the acting officer as supplied by the caller
//! - [`RequestId`]: stable UUID v7 key for an off-chain access request

pub mod error;
pub mod hash;
pub mod identity;
pub mod request;
pub mod temporal;

pub use error::TypeError;
pub use hash::BlockHash;
pub use identity::{Identity, Role};
pub use request::RequestId;
pub use temporal::Timestamp;
