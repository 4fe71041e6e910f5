//! Hashing primitives for the FIR Ledger.
//!
//! Provides domain-separated BLAKE3 hashing, the leading-zero proof-of-work
//! search used to seal blocks, and hash chain verification.
//!
//! All crypto operations wrap established libraries; there is no signing
//! here, only content hashing.

pub mod chain;
pub mod hasher;
pub mod pow;

pub use chain::{ChainError, ChainLink, HashChainVerifier};
pub use hasher::{ContentHasher, HasherError};
pub use pow::ProofOfWork;
