use serde::Serialize;

use crate::records::BlockTag;
use crate::traits::LedgerReader;

/// Result of a full-chain audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub block_count: u64,
    pub difficulty: usize,
    pub hash_chain_valid: bool,
    pub proof_of_work_valid: bool,
    pub timestamps_monotonic: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub index: usize,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    GenesisMalformed,
    HashChainBreak,
    HashMismatch,
    InsufficientWork,
    TimestampRegression,
}

/// Ledger integrity validator.
///
/// Unlike [`Ledger::verify`](crate::Ledger::verify) this does not stop at
/// the first problem; it walks every block and reports all violations.
pub struct ChainValidator;

impl ChainValidator {
    pub fn validate<R: LedgerReader>(reader: &R, difficulty: usize) -> ValidationReport {
        let blocks = reader.blocks();
        let mut violations = Vec::new();
        let mut hash_chain_valid = true;
        let mut proof_of_work_valid = true;
        let mut timestamps_monotonic = true;

        match blocks.first() {
            None => violations.push(Violation {
                index: 0,
                kind: ViolationKind::GenesisMalformed,
                description: "ledger has no genesis block".into(),
            }),
            Some(genesis) => {
                if !genesis.payload.is(BlockTag::Genesis) || !genesis.previous_hash.is_zero() {
                    hash_chain_valid = false;
                    violations.push(Violation {
                        index: 0,
                        kind: ViolationKind::GenesisMalformed,
                        description: format!(
                            "first block is {} anchored on {}",
                            genesis.payload.block_type,
                            genesis.previous_hash.short_hex()
                        ),
                    });
                }
            }
        }

        for (index, block) in blocks.iter().enumerate() {
            if index > 0 {
                let prev = &blocks[index - 1];
                if block.previous_hash != prev.hash {
                    hash_chain_valid = false;
                    violations.push(Violation {
                        index,
                        kind: ViolationKind::HashChainBreak,
                        description: "previous hash link mismatch".into(),
                    });
                }
                if block.timestamp < prev.timestamp {
                    timestamps_monotonic = false;
                    violations.push(Violation {
                        index,
                        kind: ViolationKind::TimestampRegression,
                        description: format!(
                            "timestamp {} precedes {}",
                            block.timestamp, prev.timestamp
                        ),
                    });
                }
            }

            match block.compute_hash() {
                Ok(computed) if computed == block.hash => {}
                Ok(_) => {
                    hash_chain_valid = false;
                    violations.push(Violation {
                        index,
                        kind: ViolationKind::HashMismatch,
                        description: "block hash does not match computed".into(),
                    });
                }
                Err(e) => {
                    hash_chain_valid = false;
                    violations.push(Violation {
                        index,
                        kind: ViolationKind::HashMismatch,
                        description: format!("block could not be hashed: {e}"),
                    });
                }
            }

            if !block.meets_difficulty(difficulty) {
                proof_of_work_valid = false;
                violations.push(Violation {
                    index,
                    kind: ViolationKind::InsufficientWork,
                    description: format!(
                        "hash {} has fewer than {difficulty} leading zero digit(s)",
                        block.hash.short_hex()
                    ),
                });
            }
        }

        if !violations.is_empty() {
            tracing::warn!(
                blocks = blocks.len(),
                violations = violations.len(),
                "ledger validation found violations"
            );
        }

        ValidationReport {
            block_count: blocks.len() as u64,
            difficulty,
            hash_chain_valid,
            proof_of_work_valid,
            timestamps_monotonic,
            violations,
        }
    }
}
