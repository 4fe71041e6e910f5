use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use fir_gate::{Action, AccessPolicy, CommandGate, CommandRequest, Visibility};
use fir_ledger::{
    AccessGrantRecord, AuditIndexEntry, Block, CaseTimeline, ChainValidator, EvidenceRecord,
    FirRecord, Ledger, LedgerError, LedgerSnapshot, PendingRequest, PendingRequestQueue,
    ProjectionBuilder, Record, ReplayResult, ReplayStats, StateReconstructor, TransferRecord,
    ValidationReport,
};
use fir_types::{BlockHash, Identity, RequestId};
use serde::Serialize;

use crate::config::RegistryConfig;
use crate::draft::{EvidenceDraft, FirDraft};
use crate::error::{RegistryError, RegistryResult};

/// The mutable pair guarded by the registry lock.
struct Books {
    ledger: Ledger,
    queue: PendingRequestQueue,
}

/// What an actor sees on the case dashboard.
#[derive(Clone, Debug, Serialize)]
pub struct CaseOverview {
    pub actor: Identity,
    pub visibility: Visibility,
    /// Raw audit lists, unfiltered, in ledger order.
    pub evidence_blocks: Vec<Arc<Block>>,
    pub grant_blocks: Vec<Arc<Block>>,
    pub transfer_blocks: Vec<Arc<Block>>,
    pub stats: ReplayStats,
}

/// Application state: one ledger, one pending queue, one gate.
///
/// Every command is checked by the gate first. Mutations then hold the
/// write lock for the whole read / mine / append sequence, so two commands
/// never race on the chain tip. Reads copy a [`LedgerSnapshot`] under the
/// read lock and replay it after the lock is released.
pub struct CaseRegistry {
    config: RegistryConfig,
    gate: CommandGate,
    books: RwLock<Books>,
}

impl CaseRegistry {
    pub fn new(config: RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;
        let ledger = Ledger::new(config.ledger.clone())?;
        let gate = CommandGate::with_default_stages(config.gate.clone());
        tracing::info!(
            difficulty = config.ledger.difficulty,
            permissive = config.gate.permissive,
            "case registry initialized"
        );
        Ok(Self {
            config,
            gate,
            books: RwLock::new(Books {
                ledger,
                queue: PendingRequestQueue::new(),
            }),
        })
    }

    pub fn with_defaults() -> RegistryResult<Self> {
        Self::new(RegistryConfig::default())
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ---- Commands ----

    /// Open a new case owned by the actor and the actor's department.
    pub fn register_case(&self, actor: &Identity, draft: FirDraft) -> RegistryResult<Arc<Block>> {
        self.authorize(
            CommandRequest::new(actor.clone(), Action::RegisterCase)
                .with_input("case_id", draft.case_id.as_str()),
        )?;

        let record = FirRecord {
            case_id: draft.case_id,
            complainant: draft.complainant,
            sections: draft.sections,
            location: draft.location,
            notes: draft.notes,
            department: actor.department.clone(),
            owner: actor.username.clone(),
        };
        let block = self.write()?.ledger.append(record.to_payload()?)?;

        tracing::info!(
            actor = %actor.username,
            department = %actor.department,
            case_id = %record.case_id,
            hash = %block.hash,
            "case registered"
        );
        Ok(block)
    }

    /// Record evidence against a FIR hash.
    ///
    /// The hash must parse but is not checked against the ledger; evidence
    /// naming an unknown case is stored and then ignored by replay.
    pub fn attach_evidence(
        &self,
        actor: &Identity,
        draft: EvidenceDraft,
    ) -> RegistryResult<Arc<Block>> {
        self.authorize(
            CommandRequest::new(actor.clone(), Action::AttachEvidence)
                .with_input("linked_fir_hash", draft.linked_fir_hash.as_str())
                .with_input("description", draft.description.as_str()),
        )?;

        let linked_fir_hash = BlockHash::from_hex(&draft.linked_fir_hash)?;
        let record = EvidenceRecord {
            linked_fir_hash,
            evidence_type: draft.evidence_type,
            description: draft.description,
            collecting_officer: draft.collecting_officer,
            storage_location: draft.storage_location,
            notes: draft.notes,
            added_by_dept: actor.department.clone(),
            added_by_user: actor.username.clone(),
        };
        let block = self.write()?.ledger.append(record.to_payload()?)?;

        tracing::info!(
            actor = %actor.username,
            linked_fir = %linked_fir_hash,
            hash = %block.hash,
            "evidence attached"
        );
        Ok(block)
    }

    /// Ask the case's current owner for access on behalf of the actor's
    /// department.
    pub fn request_access(
        &self,
        actor: &Identity,
        fir_hash: &BlockHash,
    ) -> RegistryResult<RequestId> {
        self.authorize(
            CommandRequest::new(actor.clone(), Action::RequestAccess)
                .with_input("fir_hash", fir_hash.to_hex()),
        )?;

        let mut books = self.write()?;
        let replay = StateReconstructor::replay(&books.ledger, &books.queue);
        let case = replay
            .case(fir_hash)
            .ok_or(RegistryError::UnknownCase(*fir_hash))?;
        let request = PendingRequest::new(
            case.current_owner_username.clone(),
            *fir_hash,
            case.case_id(),
            actor.clone(),
        );
        let owner = request.owner_username.clone();
        let id = books.queue.enqueue(request);

        tracing::info!(
            actor = %actor.username,
            department = %actor.department,
            fir = %fir_hash,
            owner = %owner,
            request = %id,
            "access requested"
        );
        Ok(id)
    }

    /// Convert a pending request into an `ACCESS_GRANT` block.
    ///
    /// The request leaves the queue only once the grant is on the ledger.
    pub fn approve_request(&self, actor: &Identity, id: &RequestId) -> RegistryResult<Arc<Block>> {
        self.authorize(
            CommandRequest::new(actor.clone(), Action::ApproveRequest)
                .with_input("request_id", id.to_string()),
        )?;

        let mut books = self.write()?;
        let request = books
            .queue
            .get(id)
            .cloned()
            .ok_or(LedgerError::RequestNotFound(*id))?;
        let record = AccessGrantRecord {
            fir_hash: request.fir_hash,
            case_id: request.case_id,
            requester_dept: request.requester.department,
            requester_username: request.requester.username,
            granter_dept: actor.department.clone(),
            granter_username: actor.username.clone(),
        };
        let block = books.ledger.append(record.to_payload()?)?;
        books.queue.remove(id)?;

        tracing::info!(
            actor = %actor.username,
            request = %id,
            grantee = %record.requester_dept,
            fir = %record.fir_hash,
            hash = %block.hash,
            "access granted"
        );
        Ok(block)
    }

    /// Reassign a case owned by the actor's department.
    ///
    /// Existing grants and pending requests are untouched.
    pub fn transfer_case(
        &self,
        actor: &Identity,
        fir_hash: &BlockHash,
        new_dept: &str,
        new_officer_username: &str,
    ) -> RegistryResult<Arc<Block>> {
        self.authorize(
            CommandRequest::new(actor.clone(), Action::TransferCase)
                .with_input("fir_hash", fir_hash.to_hex())
                .with_input("new_dept", new_dept)
                .with_input("new_officer_username", new_officer_username),
        )?;

        let mut books = self.write()?;
        let replay = StateReconstructor::replay(&books.ledger, &books.queue);
        let case = replay
            .case(fir_hash)
            .ok_or(RegistryError::UnknownCase(*fir_hash))?;
        if !case.is_owned_by(&actor.department) {
            return Err(RegistryError::NotOwner {
                fir_hash: *fir_hash,
                department: actor.department.clone(),
                owner_department: case.current_owner_department.clone(),
            });
        }

        let record = TransferRecord {
            fir_hash: *fir_hash,
            case_id: case.case_id().to_string(),
            previous_dept: actor.department.clone(),
            previous_officer_username: actor.username.clone(),
            new_dept: new_dept.trim().to_string(),
            new_officer_username: new_officer_username.trim().to_string(),
        };
        let block = books.ledger.append(record.to_payload()?)?;

        tracing::info!(
            actor = %actor.username,
            fir = %fir_hash,
            from = %record.previous_dept,
            to = %record.new_dept,
            officer = %record.new_officer_username,
            hash = %block.hash,
            "case transferred"
        );
        Ok(block)
    }

    // ---- Views ----

    /// The actor's dashboard: visibility partition plus the raw audit lists.
    pub fn cases(&self, actor: &Identity) -> RegistryResult<CaseOverview> {
        self.authorize(CommandRequest::new(actor.clone(), Action::ViewCases))?;
        let replay = self.replay()?;
        Ok(CaseOverview {
            actor: actor.clone(),
            visibility: AccessPolicy::partition(&replay.cases, actor),
            evidence_blocks: replay.evidence_blocks,
            grant_blocks: replay.grant_blocks,
            transfer_blocks: replay.transfer_blocks,
            stats: replay.stats,
        })
    }

    /// Pending requests addressed to the actor, newest first.
    pub fn inbox(&self, actor: &Identity) -> RegistryResult<Vec<PendingRequest>> {
        self.authorize(CommandRequest::new(actor.clone(), Action::ViewInbox))?;
        let books = self.read()?;
        Ok(books
            .queue
            .for_owner(&actor.username)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Chronological map of one case.
    pub fn case_timeline(
        &self,
        actor: &Identity,
        fir_hash: &BlockHash,
    ) -> RegistryResult<CaseTimeline> {
        self.authorize(
            CommandRequest::new(actor.clone(), Action::MapCase)
                .with_input("fir_hash", fir_hash.to_hex()),
        )?;
        let snapshot = self.snapshot()?;
        ProjectionBuilder::case_timeline(&snapshot, fir_hash).map_err(|e| match e {
            LedgerError::CaseNotFound(hash) => RegistryError::UnknownCase(hash),
            other => other.into(),
        })
    }

    pub fn audit_index(&self) -> RegistryResult<Vec<AuditIndexEntry>> {
        Ok(ProjectionBuilder::audit_index(&self.snapshot()?))
    }

    /// Atomic copy of the ledger and the pending queue.
    pub fn snapshot(&self) -> RegistryResult<LedgerSnapshot> {
        let books = self.read()?;
        Ok(LedgerSnapshot::capture(&books.ledger, &books.queue))
    }

    pub fn replay(&self) -> RegistryResult<ReplayResult> {
        Ok(StateReconstructor::replay_snapshot(&self.snapshot()?))
    }

    pub fn validate_chain(&self) -> RegistryResult<ValidationReport> {
        let snapshot = self.snapshot()?;
        Ok(ChainValidator::validate(&snapshot, self.config.ledger.difficulty))
    }

    // ---- Internals ----

    fn authorize(&self, request: CommandRequest) -> RegistryResult<()> {
        self.gate.authorize(&request)?;
        Ok(())
    }

    fn read(&self) -> RegistryResult<RwLockReadGuard<'_, Books>> {
        self.books.read().map_err(|_| RegistryError::LockPoisoned)
    }

    fn write(&self) -> RegistryResult<RwLockWriteGuard<'_, Books>> {
        self.books.write().map_err(|_| RegistryError::LockPoisoned)
    }
}
