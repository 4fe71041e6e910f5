use fir_crypto::{ChainLink, ContentHasher, HasherError, ProofOfWork};
use fir_types::{BlockHash, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::records::{BlockTag, Payload, Record};

/// One immutable, hash-sealed ledger entry.
///
/// `hash` is BLAKE3 over `fir-block-v1:` followed by the compact JSON object
/// `{"timestamp", "payload", "previous_hash", "nonce"}` in that key order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub timestamp: Timestamp,
    pub payload: Payload,
    pub previous_hash: BlockHash,
    pub nonce: u64,
    pub hash: BlockHash,
}

#[derive(Serialize)]
struct HashedHeader<'a> {
    timestamp: &'a Timestamp,
    payload: &'a Payload,
    previous_hash: &'a BlockHash,
    nonce: u64,
}

impl Block {
    /// Build an unsealed block with nonce 0 and its matching hash.
    pub fn new(
        timestamp: Timestamp,
        payload: Payload,
        previous_hash: BlockHash,
    ) -> Result<Self, LedgerError> {
        let mut block = Self {
            timestamp,
            payload,
            previous_hash,
            nonce: 0,
            hash: BlockHash::zero(),
        };
        block.hash = block.compute_hash()?;
        Ok(block)
    }

    /// Recompute the hash from the stored fields and current nonce.
    pub fn compute_hash(&self) -> Result<BlockHash, LedgerError> {
        self.hash_at(self.nonce)
    }

    /// Returns `true` if the stored hash matches the stored fields.
    pub fn verify_hash(&self) -> bool {
        self.compute_hash().map(|h| h == self.hash).unwrap_or(false)
    }

    /// Returns `true` if the stored hash carries `difficulty` leading zeros.
    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        ProofOfWork::new(difficulty).is_satisfied_by(&self.hash)
    }

    /// Increment the nonce until the hash starts with `difficulty` zero hex
    /// digits, then return the sealed block.
    ///
    /// CPU-bound and unbounded in time; callers keep `difficulty` small.
    pub fn mine(mut self, difficulty: usize) -> Result<Self, LedgerError> {
        if difficulty > ProofOfWork::MAX_DIFFICULTY {
            return Err(LedgerError::DifficultyTooHigh {
                requested: difficulty,
                max: ProofOfWork::MAX_DIFFICULTY,
            });
        }

        let (nonce, hash) =
            ProofOfWork::new(difficulty).try_search(self.nonce, |n| self.hash_at(n))?;
        self.nonce = nonce;
        self.hash = hash;

        tracing::debug!(
            hash = %self.hash,
            nonce = self.nonce,
            block_type = %self.payload.block_type,
            "block mined"
        );
        Ok(self)
    }

    pub fn tag(&self) -> Option<BlockTag> {
        self.payload.tag()
    }

    pub fn is_genesis(&self) -> bool {
        self.payload.is(BlockTag::Genesis)
    }

    /// Parse the payload as a typed record.
    pub fn record<R: Record>(&self) -> Option<R> {
        self.payload.parse()
    }

    fn hash_at(&self, nonce: u64) -> Result<BlockHash, LedgerError> {
        let header = HashedHeader {
            timestamp: &self.timestamp,
            payload: &self.payload,
            previous_hash: &self.previous_hash,
            nonce,
        };
        Ok(ContentHasher::BLOCK.hash_json(&header)?)
    }
}

impl ChainLink for Block {
    fn block_hash(&self) -> BlockHash {
        self.hash
    }

    fn previous_hash(&self) -> BlockHash {
        self.previous_hash
    }

    fn computed_hash(&self) -> Result<BlockHash, HasherError> {
        self.compute_hash().map_err(|e| HasherError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::FirRecord;
    use proptest::prelude::*;

    fn payload() -> Payload {
        FirRecord {
            case_id: "FIR-7".into(),
            department: "Cyber Crime".into(),
            owner: "si_cyber".into(),
            ..Default::default()
        }
        .to_payload()
        .unwrap()
    }

    #[test]
    fn new_block_hash_matches_fields() {
        let block = Block::new(Timestamp::new(10, 0), payload(), BlockHash::zero()).unwrap();
        assert_eq!(block.nonce, 0);
        assert!(block.verify_hash());
    }

    #[test]
    fn mined_block_meets_difficulty() {
        let block = Block::new(Timestamp::new(10, 0), payload(), BlockHash::zero())
            .unwrap()
            .mine(2)
            .unwrap();
        assert!(block.hash.to_hex().starts_with("00"));
        assert!(block.meets_difficulty(2));
        assert!(block.verify_hash());
    }

    #[test]
    fn tampered_payload_breaks_hash() {
        let mut block = Block::new(Timestamp::new(10, 0), payload(), BlockHash::zero())
            .unwrap()
            .mine(1)
            .unwrap();
        block.payload = block.payload.with_field("owner", "intruder");
        assert!(!block.verify_hash());
    }

    #[test]
    fn every_hashed_field_matters() {
        let base = Block::new(Timestamp::new(10, 0), payload(), BlockHash::zero()).unwrap();

        let mut other = base.clone();
        other.timestamp = Timestamp::new(11, 0);
        assert_ne!(other.compute_hash().unwrap(), base.hash);

        let mut other = base.clone();
        other.previous_hash = BlockHash::from_bytes([7; 32]);
        assert_ne!(other.compute_hash().unwrap(), base.hash);

        let mut other = base.clone();
        other.nonce = 1;
        assert_ne!(other.compute_hash().unwrap(), base.hash);
    }

    #[test]
    fn hash_encoding_is_pinned() {
        let block =
            Block::new(Timestamp::new(0, 0), Payload::genesis(), BlockHash::zero()).unwrap();
        let encoded = [
            r#"{"timestamp":{"physical_ms":0,"logical":0},"#,
            r#""payload":{"block_type":"GENESIS","fields":{}},"#,
            format!(r#""previous_hash":"{}","#, "0".repeat(64)).as_str(),
            r#""nonce":0}"#,
        ]
        .concat();
        assert_eq!(block.hash, ContentHasher::BLOCK.hash(encoded.as_bytes()));
    }

    #[test]
    fn mined_hash_is_plain_json_of_sealed_fields() {
        #[derive(Serialize)]
        struct Sealed {
            timestamp: Timestamp,
            payload: Payload,
            previous_hash: BlockHash,
            nonce: u64,
        }

        let block = Block::new(Timestamp::new(42, 3), payload(), BlockHash::from_bytes([9; 32]))
            .unwrap()
            .mine(1)
            .unwrap();
        let sealed = Sealed {
            timestamp: block.timestamp,
            payload: block.payload.clone(),
            previous_hash: block.previous_hash,
            nonce: block.nonce,
        };
        assert_eq!(ContentHasher::BLOCK.hash_json(&sealed).unwrap(), block.hash);
    }

    #[test]
    fn absurd_difficulty_rejected() {
        let block = Block::new(Timestamp::zero(), Payload::genesis(), BlockHash::zero()).unwrap();
        assert_eq!(
            block.mine(65).unwrap_err(),
            LedgerError::DifficultyTooHigh {
                requested: 65,
                max: 64
            }
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn mining_preserves_hash_invariant(
            ms in 0u64..1_000_000,
            note in "[a-z ]{0,24}",
            d in 0usize..3,
        ) {
            let payload = Payload::new("MEMO").with_field("note", note);
            let block = Block::new(Timestamp::new(ms, 0), payload, BlockHash::zero())
                .unwrap()
                .mine(d)
                .unwrap();
            prop_assert!(block.hash.to_hex().starts_with(&"0".repeat(d)));
            prop_assert_eq!(block.compute_hash().unwrap(), block.hash);
        }
    }
}
