use fir_types::BlockHash;

use crate::hasher::HasherError;

/// Trait for records that participate in a hash chain.
pub trait ChainLink {
    /// The record's own stored hash.
    fn block_hash(&self) -> BlockHash;
    /// The previous record's hash (the zero hash for genesis).
    fn previous_hash(&self) -> BlockHash;
    /// Recompute the hash from the record's stored fields.
    fn computed_hash(&self) -> Result<BlockHash, HasherError>;
}

impl<T: ChainLink + ?Sized> ChainLink for std::sync::Arc<T> {
    fn block_hash(&self) -> BlockHash {
        (**self).block_hash()
    }

    fn previous_hash(&self) -> BlockHash {
        (**self).previous_hash()
    }

    fn computed_hash(&self) -> Result<BlockHash, HasherError> {
        (**self).computed_hash()
    }
}

/// Hash chain integrity verifier.
///
/// Verifies that a sequence of records forms a valid hash chain: each
/// record's `previous_hash` matches the previous record's hash, and each
/// stored hash is reproduced by recomputing it. Fails on the first break.
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Verify a chain of records.
    ///
    /// Checks:
    /// 1. First record is anchored on the zero hash
    /// 2. Each subsequent record's previous_hash matches the prior hash
    /// 3. Each record's hash is correct for its contents
    pub fn verify_chain(records: &[impl ChainLink]) -> Result<(), ChainError> {
        let Some(first) = records.first() else {
            return Ok(());
        };

        if !first.previous_hash().is_zero() {
            return Err(ChainError::GenesisNotAnchored);
        }

        for (index, record) in records.iter().enumerate() {
            if index > 0 && record.previous_hash() != records[index - 1].block_hash() {
                return Err(ChainError::BrokenLink { index });
            }

            let computed = record
                .computed_hash()
                .map_err(|e| ChainError::Unhashable {
                    index,
                    reason: e.to_string(),
                })?;
            if computed != record.block_hash() {
                return Err(ChainError::HashMismatch { index });
            }
        }

        Ok(())
    }
}

/// Errors from chain verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("genesis record does not reference the zero hash")]
    GenesisNotAnchored,

    #[error("broken link at index {index}: previous_hash does not match")]
    BrokenLink { index: usize },

    #[error("hash mismatch at index {index}: computed hash differs from stored")]
    HashMismatch { index: usize },

    #[error("record at index {index} could not be hashed: {reason}")]
    Unhashable { index: usize, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::ContentHasher;

    struct TestRecord {
        hash: BlockHash,
        prev: BlockHash,
        payload: Vec<u8>,
    }

    fn digest(prev: &BlockHash, payload: &[u8]) -> BlockHash {
        let mut data = prev.as_bytes().to_vec();
        data.extend_from_slice(payload);
        ContentHasher::BLOCK.hash(&data)
    }

    impl ChainLink for TestRecord {
        fn block_hash(&self) -> BlockHash {
            self.hash
        }
        fn previous_hash(&self) -> BlockHash {
            self.prev
        }
        fn computed_hash(&self) -> Result<BlockHash, HasherError> {
            Ok(digest(&self.prev, &self.payload))
        }
    }

    fn build_chain(count: usize) -> Vec<TestRecord> {
        let mut chain = Vec::new();
        let mut prev = BlockHash::zero();
        for i in 0..count {
            let payload = format!("record-{i}").into_bytes();
            let hash = digest(&prev, &payload);
            chain.push(TestRecord {
                hash,
                prev,
                payload,
            });
            prev = hash;
        }
        chain
    }

    #[test]
    fn empty_chain_is_valid() {
        let chain: Vec<TestRecord> = vec![];
        assert!(HashChainVerifier::verify_chain(&chain).is_ok());
    }

    #[test]
    fn multi_record_chain() {
        assert!(HashChainVerifier::verify_chain(&build_chain(10)).is_ok());
    }

    #[test]
    fn unanchored_genesis_fails() {
        let mut chain = build_chain(1);
        chain[0].prev = BlockHash::from_bytes([1; 32]);
        assert_eq!(
            HashChainVerifier::verify_chain(&chain).unwrap_err(),
            ChainError::GenesisNotAnchored
        );
    }

    #[test]
    fn broken_link_detected() {
        let mut chain = build_chain(3);
        chain[2].prev = BlockHash::from_bytes([99; 32]);
        assert_eq!(
            HashChainVerifier::verify_chain(&chain).unwrap_err(),
            ChainError::BrokenLink { index: 2 }
        );
    }

    #[test]
    fn tampered_payload_detected() {
        let mut chain = build_chain(3);
        chain[1].payload = b"tampered".to_vec();
        assert_eq!(
            HashChainVerifier::verify_chain(&chain).unwrap_err(),
            ChainError::HashMismatch { index: 1 }
        );
    }
}
