use std::collections::HashMap;

use fir_types::{BlockHash, Identity, RequestId};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// An unresolved request by another department to view a case.
///
/// Lives off-chain until an approval consumes it and records an
/// `ACCESS_GRANT` block in its place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub id: RequestId,
    /// Case owner at the time the request was made; the request shows up in
    /// this officer's inbox.
    pub owner_username: String,
    pub fir_hash: BlockHash,
    pub case_id: String,
    pub requester: Identity,
}

impl PendingRequest {
    pub fn new(
        owner_username: impl Into<String>,
        fir_hash: BlockHash,
        case_id: impl Into<String>,
        requester: Identity,
    ) -> Self {
        Self {
            id: RequestId::new(),
            owner_username: owner_username.into(),
            fir_hash,
            case_id: case_id.into(),
            requester,
        }
    }
}

/// Off-chain overlay of pending access requests.
///
/// Entries are keyed by [`RequestId`]; insertion order is kept separately so
/// iteration is deterministic. No deduplication: the same department may hold
/// several live requests for one case.
#[derive(Clone, Debug, Default)]
pub struct PendingRequestQueue {
    entries: HashMap<RequestId, PendingRequest>,
    order: Vec<RequestId>,
}

impl PendingRequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request and return its key.
    pub fn enqueue(&mut self, request: PendingRequest) -> RequestId {
        let id = request.id;
        if self.entries.insert(id, request).is_none() {
            self.order.push(id);
        }
        tracing::debug!(request = %id, live = self.entries.len(), "access request queued");
        id
    }

    /// Remove and return exactly one entry.
    pub fn remove(&mut self, id: &RequestId) -> Result<PendingRequest, LedgerError> {
        let request = self
            .entries
            .remove(id)
            .ok_or(LedgerError::RequestNotFound(*id))?;
        self.order.retain(|queued| queued != id);
        Ok(request)
    }

    pub fn get(&self, id: &RequestId) -> Option<&PendingRequest> {
        self.entries.get(id)
    }

    /// All live entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &PendingRequest> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Live entries referencing one case, in insertion order.
    pub fn entries_for(&self, fir_hash: BlockHash) -> impl Iterator<Item = &PendingRequest> + '_ {
        self.entries().filter(move |r| r.fir_hash == fir_hash)
    }

    /// Requests addressed to `username`, newest first.
    pub fn for_owner(&self, username: &str) -> Vec<&PendingRequest> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.entries.get(id))
            .filter(|r| r.owner_username == username)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fir(n: u8) -> BlockHash {
        BlockHash::from_bytes([n; 32])
    }

    fn request(owner: &str, case: u8, dept: &str) -> PendingRequest {
        PendingRequest::new(
            owner,
            fir(case),
            format!("FIR-{case}"),
            Identity::constable(format!("constable_{dept}"), dept),
        )
    }

    #[test]
    fn enqueue_and_remove_by_id() {
        let mut queue = PendingRequestQueue::new();
        let a = queue.enqueue(request("si_state", 1, "CBI"));
        let b = queue.enqueue(request("si_state", 1, "Cyber Crime"));
        assert_eq!(queue.len(), 2);

        let removed = queue.remove(&a).unwrap();
        assert_eq!(removed.requester.department, "CBI");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.entries().next().unwrap().id, b);
    }

    #[test]
    fn remove_unknown_id_is_not_found() {
        let mut queue = PendingRequestQueue::new();
        let id = queue.enqueue(request("si_state", 1, "CBI"));
        queue.remove(&id).unwrap();
        assert_eq!(queue.remove(&id).unwrap_err(), LedgerError::RequestNotFound(id));
        assert!(queue.is_empty());
    }

    #[test]
    fn ids_stay_valid_after_other_removals() {
        let mut queue = PendingRequestQueue::new();
        let first = queue.enqueue(request("si_state", 1, "CBI"));
        let second = queue.enqueue(request("si_state", 2, "CBI"));
        let third = queue.enqueue(request("si_state", 3, "CBI"));

        queue.remove(&first).unwrap();
        let removed = queue.remove(&third).unwrap();
        assert_eq!(removed.fir_hash, fir(3));
        assert_eq!(queue.get(&second).unwrap().fir_hash, fir(2));
    }

    #[test]
    fn duplicates_are_kept() {
        let mut queue = PendingRequestQueue::new();
        queue.enqueue(request("si_state", 1, "CBI"));
        queue.enqueue(request("si_state", 1, "CBI"));
        assert_eq!(queue.entries_for(fir(1)).count(), 2);
    }

    #[test]
    fn entries_for_filters_by_case() {
        let mut queue = PendingRequestQueue::new();
        queue.enqueue(request("si_state", 1, "CBI"));
        queue.enqueue(request("si_state", 2, "CBI"));
        queue.enqueue(request("si_state", 1, "Cyber Crime"));
        let depts: Vec<_> = queue
            .entries_for(fir(1))
            .map(|r| r.requester.department.as_str())
            .collect();
        assert_eq!(depts, vec!["CBI", "Cyber Crime"]);
    }

    #[test]
    fn inbox_is_newest_first_and_owner_scoped() {
        let mut queue = PendingRequestQueue::new();
        let older = queue.enqueue(request("si_state", 1, "CBI"));
        queue.enqueue(request("si_cbi", 2, "State Police"));
        let newer = queue.enqueue(request("si_state", 3, "Cyber Crime"));

        let inbox: Vec<_> = queue.for_owner("si_state").iter().map(|r| r.id).collect();
        assert_eq!(inbox, vec![newer, older]);
        assert!(queue.for_owner("judge1").is_empty());
    }
}
