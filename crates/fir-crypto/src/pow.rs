use std::convert::Infallible;

use fir_types::BlockHash;

/// Leading-zero proof of work.
///
/// A hash satisfies difficulty `d` when its hex rendering starts with `d`
/// zero digits. There is no retargeting and no timeout: [`ProofOfWork::search`]
/// loops until it finds a nonce, which is only practical for small `d`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: usize,
}

impl ProofOfWork {
    /// Hex digits in a 32-byte digest; higher difficulties can never be met.
    pub const MAX_DIFFICULTY: usize = 64;

    pub fn new(difficulty: usize) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Returns `true` if `hash` starts with the required zero digits.
    pub fn is_satisfied_by(&self, hash: &BlockHash) -> bool {
        hash.leading_zero_digits() >= self.difficulty
    }

    /// Search nonces upward from `start` until `hash_at(nonce)` meets the
    /// difficulty. Returns the winning nonce and its hash.
    ///
    /// `start` itself is tried first, so an already-sealed input returns
    /// immediately.
    pub fn search<F>(&self, start: u64, mut hash_at: F) -> (u64, BlockHash)
    where
        F: FnMut(u64) -> BlockHash,
    {
        match self.try_search(start, |nonce| Ok::<_, Infallible>(hash_at(nonce))) {
            Ok(found) => found,
            Err(never) => match never {},
        }
    }

    /// Like [`search`](Self::search), for hash functions that can fail.
    /// The first error stops the search.
    pub fn try_search<F, E>(&self, start: u64, mut hash_at: F) -> Result<(u64, BlockHash), E>
    where
        F: FnMut(u64) -> Result<BlockHash, E>,
    {
        let mut nonce = start;
        loop {
            let hash = hash_at(nonce)?;
            if self.is_satisfied_by(&hash) {
                return Ok((nonce, hash));
            }
            nonce = nonce.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::ContentHasher;
    use proptest::prelude::*;

    fn hash_with_nonce(payload: &[u8], nonce: u64) -> BlockHash {
        let mut data = payload.to_vec();
        data.extend_from_slice(&nonce.to_le_bytes());
        ContentHasher::BLOCK.hash(&data)
    }

    #[test]
    fn difficulty_zero_accepts_first_nonce() {
        let pow = ProofOfWork::new(0);
        let (nonce, _) = pow.search(0, |n| hash_with_nonce(b"genesis", n));
        assert_eq!(nonce, 0);
    }

    #[test]
    fn search_finds_leading_zeros() {
        let pow = ProofOfWork::new(2);
        let (nonce, hash) = pow.search(0, |n| hash_with_nonce(b"fir", n));
        assert!(hash.to_hex().starts_with("00"));
        assert_eq!(hash, hash_with_nonce(b"fir", nonce));
    }

    #[test]
    fn try_search_stops_at_first_error() {
        let pow = ProofOfWork::new(64);
        let mut calls = 0;
        let result = pow.try_search(0, |n| {
            calls += 1;
            if n == 3 {
                Err("boom")
            } else {
                Ok(hash_with_nonce(b"fir", n))
            }
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 4);
    }

    #[test]
    fn is_satisfied_by_checks_prefix() {
        let mut bytes = [0xffu8; 32];
        bytes[0] = 0x00;
        bytes[1] = 0x0a;
        let hash = BlockHash::from_bytes(bytes);
        assert!(ProofOfWork::new(3).is_satisfied_by(&hash));
        assert!(!ProofOfWork::new(4).is_satisfied_by(&hash));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn mined_hash_meets_difficulty(
            payload in proptest::collection::vec(any::<u8>(), 0..64),
            d in 0usize..3,
        ) {
            let pow = ProofOfWork::new(d);
            let (nonce, hash) = pow.search(0, |n| hash_with_nonce(&payload, n));
            prop_assert!(hash.to_hex().starts_with(&"0".repeat(d)));
            prop_assert_eq!(hash, hash_with_nonce(&payload, nonce));
        }
    }
}
