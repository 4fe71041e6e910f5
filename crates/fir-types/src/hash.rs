use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Content hash of a sealed ledger block.
///
/// A `BlockHash` is the BLAKE3 digest of a block's canonical encoding. It is
/// also the only way records refer to each other: evidence, grants, and
/// transfers name their case by the FIR block's hash. On the wire (JSON,
/// TOML, payload fields) it is always 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    /// Create a `BlockHash` from a pre-computed digest.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The all-zero hash. Used as the genesis block's `previous_hash`.
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Returns `true` if this is the all-zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 12 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..6])
    }

    /// Number of leading `'0'` characters in the hex rendering.
    pub fn leading_zero_digits(&self) -> usize {
        let mut count = 0;
        for byte in self.0 {
            if byte == 0 {
                count += 2;
                continue;
            }
            if byte >> 4 == 0 {
                count += 1;
            }
            break;
        }
        count
    }

    /// Parse from a hex string (64 hex characters).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s.trim()).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.short_hex())
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for BlockHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for BlockHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hex_roundtrip() {
        let hash = BlockHash::from_bytes([0xab; 32]);
        let parsed = BlockHash::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn invalid_hex_rejected() {
        let err = BlockHash::from_hex("not-hex").unwrap_err();
        assert!(matches!(err, TypeError::InvalidHex(_)));
    }

    #[test]
    fn wrong_length_rejected() {
        let err = BlockHash::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn zero_sentinel() {
        assert!(BlockHash::zero().is_zero());
        assert!(!BlockHash::from_bytes([1; 32]).is_zero());
        assert_eq!(BlockHash::zero().leading_zero_digits(), 64);
    }

    #[test]
    fn leading_zero_digits_counts_nibbles() {
        let mut bytes = [0xffu8; 32];
        assert_eq!(BlockHash::from_bytes(bytes).leading_zero_digits(), 0);
        bytes[0] = 0x0f;
        assert_eq!(BlockHash::from_bytes(bytes).leading_zero_digits(), 1);
        bytes[0] = 0x00;
        bytes[1] = 0x3a;
        assert_eq!(BlockHash::from_bytes(bytes).leading_zero_digits(), 2);
        bytes[1] = 0x05;
        assert_eq!(BlockHash::from_bytes(bytes).leading_zero_digits(), 3);
    }

    #[test]
    fn serializes_as_hex_string() {
        let hash = BlockHash::from_bytes([0x01; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        let back: BlockHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    proptest! {
        #[test]
        fn leading_zero_digits_matches_hex_rendering(bytes in any::<[u8; 32]>()) {
            let hash = BlockHash::from_bytes(bytes);
            let expected = hash.to_hex().chars().take_while(|c| *c == '0').count();
            prop_assert_eq!(hash.leading_zero_digits(), expected);
        }
    }
}
