use std::collections::BTreeMap;
use std::fmt;

use fir_types::BlockHash;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LedgerError;

/// Known payload tags.
///
/// The ledger itself stores tags as plain strings; a block whose tag is not
/// listed here is legal and simply ignored by replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockTag {
    Genesis,
    Fir,
    Evidence,
    AccessGrant,
    TransferOwnership,
}

impl BlockTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Genesis => "GENESIS",
            Self::Fir => "FIR",
            Self::Evidence => "EVIDENCE",
            Self::AccessGrant => "ACCESS_GRANT",
            Self::TransferOwnership => "TRANSFER_OWNERSHIP",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GENESIS" => Some(Self::Genesis),
            "FIR" => Some(Self::Fir),
            "EVIDENCE" => Some(Self::Evidence),
            "ACCESS_GRANT" => Some(Self::AccessGrant),
            "TRANSFER_OWNERSHIP" => Some(Self::TransferOwnership),
            _ => None,
        }
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Untyped block payload: a tag plus named fields.
///
/// Fields live in a `BTreeMap`, so the serialized form (and therefore the
/// block hash) does not depend on insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub block_type: String,
    pub fields: BTreeMap<String, Value>,
}

impl Payload {
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// The payload of the genesis block.
    pub fn genesis() -> Self {
        Self::new(BlockTag::Genesis.as_str())
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// The parsed tag, or `None` for tags replay does not interpret.
    pub fn tag(&self) -> Option<BlockTag> {
        BlockTag::parse(&self.block_type)
    }

    pub fn is(&self, tag: BlockTag) -> bool {
        self.block_type == tag.as_str()
    }

    /// A field's value if it is present and a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Parse this payload as a typed record.
    ///
    /// Returns `None` when the tag differs or a required field is missing or
    /// has the wrong shape.
    pub fn parse<R: Record>(&self) -> Option<R> {
        R::from_payload(self)
    }
}

/// A typed view over a [`Payload`].
pub trait Record: Serialize + DeserializeOwned {
    const TAG: BlockTag;

    /// Encode this record as an untyped payload.
    fn to_payload(&self) -> Result<Payload, LedgerError> {
        match serde_json::to_value(self).map_err(|e| LedgerError::Serialization(e.to_string()))? {
            Value::Object(map) => Ok(Payload {
                block_type: Self::TAG.as_str().to_string(),
                fields: map.into_iter().collect(),
            }),
            other => Err(LedgerError::Serialization(format!(
                "{} record encoded as non-object: {other}",
                Self::TAG
            ))),
        }
    }

    /// Decode from an untyped payload; `None` if the tag or fields do not fit.
    fn from_payload(payload: &Payload) -> Option<Self> {
        if !payload.is(Self::TAG) {
            return None;
        }
        let object: serde_json::Map<String, Value> = payload
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        serde_json::from_value(Value::Object(object)).ok()
    }
}

/// Case-opening record.
///
/// Only `department` and `owner` are needed to seed a case during replay;
/// the free-text fields default to empty when absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirRecord {
    #[serde(default)]
    pub case_id: String,
    #[serde(default)]
    pub complainant: String,
    #[serde(default)]
    pub sections: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: String,
    /// Originating department.
    pub department: String,
    /// Originating officer username.
    pub owner: String,
}

impl Record for FirRecord {
    const TAG: BlockTag = BlockTag::Fir;
}

/// Evidence attached to a case by FIR hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub linked_fir_hash: BlockHash,
    #[serde(default)]
    pub evidence_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub collecting_officer: String,
    #[serde(default)]
    pub storage_location: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub added_by_dept: String,
    #[serde(default)]
    pub added_by_user: String,
}

impl Record for EvidenceRecord {
    const TAG: BlockTag = BlockTag::Evidence;
}

/// Permanent permission for `requester_dept` to view a case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrantRecord {
    pub fir_hash: BlockHash,
    #[serde(default)]
    pub case_id: String,
    pub requester_dept: String,
    #[serde(default)]
    pub requester_username: String,
    #[serde(default)]
    pub granter_dept: String,
    #[serde(default)]
    pub granter_username: String,
}

impl Record for AccessGrantRecord {
    const TAG: BlockTag = BlockTag::AccessGrant;
}

/// Reassignment of a case's owning department and officer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub fir_hash: BlockHash,
    #[serde(default)]
    pub case_id: String,
    #[serde(default)]
    pub previous_dept: String,
    #[serde(default)]
    pub previous_officer_username: String,
    pub new_dept: String,
    pub new_officer_username: String,
}

impl Record for TransferRecord {
    const TAG: BlockTag = BlockTag::TransferOwnership;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fir() -> FirRecord {
        FirRecord {
            case_id: "FIR-101/2024".into(),
            complainant: "R. Sharma".into(),
            sections: "IPC 379".into(),
            location: "Sector 14".into(),
            notes: String::new(),
            department: "State Police".into(),
            owner: "si_state".into(),
        }
    }

    #[test]
    fn record_roundtrips_through_payload() {
        let payload = fir().to_payload().unwrap();
        assert_eq!(payload.block_type, "FIR");
        assert_eq!(payload.tag(), Some(BlockTag::Fir));
        assert_eq!(payload.field_str("owner"), Some("si_state"));
        assert_eq!(payload.parse::<FirRecord>(), Some(fir()));
    }

    #[test]
    fn wrong_tag_does_not_parse() {
        let payload = fir().to_payload().unwrap();
        assert!(payload.parse::<EvidenceRecord>().is_none());
    }

    #[test]
    fn missing_required_field_does_not_parse() {
        let mut payload = fir().to_payload().unwrap();
        payload.fields.remove("department");
        assert!(payload.parse::<FirRecord>().is_none());
    }

    #[test]
    fn missing_free_text_defaults_to_empty() {
        let payload = Payload::new("FIR")
            .with_field("department", "CBI")
            .with_field("owner", "si_cbi");
        let parsed: FirRecord = payload.parse().unwrap();
        assert_eq!(parsed.case_id, "");
        assert_eq!(parsed.department, "CBI");
    }

    #[test]
    fn malformed_hash_reference_does_not_parse() {
        let payload = Payload::new("EVIDENCE").with_field("linked_fir_hash", "zzzz");
        assert!(payload.parse::<EvidenceRecord>().is_none());
    }

    #[test]
    fn unknown_tag_is_untyped() {
        let payload = Payload::new("MEMO").with_field("text", "hello");
        assert_eq!(payload.tag(), None);
        assert!(!payload.is(BlockTag::Fir));
    }

    #[test]
    fn field_order_does_not_affect_encoding() {
        let a = Payload::new("X").with_field("b", 1).with_field("a", 2);
        let b = Payload::new("X").with_field("a", 2).with_field("b", 1);
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }
}
