use std::collections::BTreeMap;

use fir_ledger::CaseState;
use fir_types::{BlockHash, Identity, Role};
use serde::Serialize;

/// Why an actor can see a case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Access {
    /// The actor's department currently owns the case.
    Owned,
    /// The actor's department holds a recorded grant.
    Granted,
    /// Judges see everything.
    Judicial,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VisibleCase {
    pub case: CaseState,
    pub access: Access,
}

/// A case the actor can list but not open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OtherCase {
    pub case: CaseState,
    /// The actor's department already has a live request for this case.
    pub request_pending: bool,
}

/// Per-actor partition of all reconstructed cases, in FIR-hash order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub visible: Vec<VisibleCase>,
    pub other: Vec<OtherCase>,
}

impl Visibility {
    pub fn owned(&self) -> impl Iterator<Item = &CaseState> + '_ {
        self.with_access(Access::Owned)
    }

    pub fn granted(&self) -> impl Iterator<Item = &CaseState> + '_ {
        self.with_access(Access::Granted)
    }

    pub fn is_visible(&self, fir_hash: &BlockHash) -> bool {
        self.visible.iter().any(|v| v.case.fir_hash == *fir_hash)
    }

    fn with_access(&self, access: Access) -> impl Iterator<Item = &CaseState> + '_ {
        self.visible
            .iter()
            .filter(move |v| v.access == access)
            .map(|v| &v.case)
    }
}

/// Maps reconstructed case state and an actor to what that actor may see.
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn partition(cases: &BTreeMap<BlockHash, CaseState>, actor: &Identity) -> Visibility {
        let mut visibility = Visibility::default();
        for case in cases.values() {
            match Self::access(case, actor.role, &actor.department) {
                Some(access) => visibility.visible.push(VisibleCase {
                    case: case.clone(),
                    access,
                }),
                None => visibility.other.push(OtherCase {
                    request_pending: case.is_pending_for(&actor.department),
                    case: case.clone(),
                }),
            }
        }
        visibility
    }

    /// Access level for one case, or `None` if the case is not visible.
    pub fn access(case: &CaseState, role: Role, department: &str) -> Option<Access> {
        if !role.is_police() {
            Some(Access::Judicial)
        } else if case.is_owned_by(department) {
            Some(Access::Owned)
        } else if case.is_granted_to(department) {
            Some(Access::Granted)
        } else {
            None
        }
    }
}
