use fir_types::BlockHash;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no case with FIR hash {0}")]
    UnknownCase(BlockHash),

    #[error("case {fir_hash} is owned by {owner_department}, not {department}")]
    NotOwner {
        fir_hash: BlockHash,
        department: String,
        owner_department: String,
    },

    #[error("registry lock poisoned")]
    LockPoisoned,

    #[error("invalid input: {0}")]
    Type(#[from] fir_types::TypeError),

    #[error("ledger error: {0}")]
    Ledger(#[from] fir_ledger::LedgerError),

    #[error("{0}")]
    Gate(#[from] fir_gate::GateError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
