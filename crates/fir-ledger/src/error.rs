use fir_types::{BlockHash, RequestId};

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger has no blocks")]
    EmptyLedger,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("pending request {0} not found")]
    RequestNotFound(RequestId),

    #[error("no FIR block with hash {0}")]
    CaseNotFound(BlockHash),

    #[error("difficulty {requested} exceeds the maximum of {max}")]
    DifficultyTooHigh { requested: usize, max: usize },
}

impl From<fir_crypto::HasherError> for LedgerError {
    fn from(err: fir_crypto::HasherError) -> Self {
        match err {
            fir_crypto::HasherError::Serialization(reason) => Self::Serialization(reason),
        }
    }
}
