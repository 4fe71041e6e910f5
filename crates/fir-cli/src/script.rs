//! Scripted sessions: a TOML list of actors and steps replayed against a
//! fresh registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use fir_sdk::{
    Block, BlockHash, CaseOverview, CaseRegistry, CaseTimeline, EvidenceDraft, FirDraft, Identity,
    PendingRequest, RequestId, Role, ValidationReport,
};
use serde::{Deserialize, Serialize};

/// The walkthrough run by `firl demo`.
pub const DEMO_SCRIPT: &str = r#"
[actors.si_state]
role = "SI"
department = "State Police"

[actors.constable_cbi]
role = "Constable"
department = "CBI"

[actors.si_cyber]
role = "SI"
department = "Cyber Crime"

[actors.judge1]
role = "Judge"
department = "District Court"

[[step]]
command = "register_case"
actor = "si_state"
case_id = "FIR-101/2024"
complainant = "R. Sharma"
sections = "IPC 379"
location = "Sector 14 market"

[[step]]
command = "attach_evidence"
actor = "si_state"
case = "FIR-101/2024"
evidence_type = "Digital"
description = "CCTV export, north gate, 21:40-22:10"
collecting_officer = "HC Verma"
storage_location = "Evidence locker 4"

[[step]]
command = "register_case"
actor = "constable_cbi"
case_id = "FIR-999/2024"
expect_failure = true

[[step]]
command = "view_cases"
actor = "constable_cbi"

[[step]]
command = "request_access"
actor = "constable_cbi"
case = "FIR-101/2024"

[[step]]
command = "inbox"
actor = "si_state"

[[step]]
command = "approve"
actor = "si_state"
case = "FIR-101/2024"
requester = "constable_cbi"

[[step]]
command = "view_cases"
actor = "constable_cbi"

[[step]]
command = "transfer"
actor = "si_cyber"
case = "FIR-101/2024"
new_dept = "Cyber Crime"
new_officer = "si_cyber"
expect_failure = true

[[step]]
command = "transfer"
actor = "si_state"
case = "FIR-101/2024"
new_dept = "Cyber Crime"
new_officer = "si_cyber"

[[step]]
command = "view_cases"
actor = "si_cyber"

[[step]]
command = "attach_evidence"
actor = "si_state"
case = "00000000000000000000000000000000000000000000000000000000000000ff"
description = "misfiled exhibit"

[[step]]
command = "map_case"
actor = "judge1"
case = "FIR-101/2024"

[[step]]
command = "validate"
"#;

#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub actors: BTreeMap<String, ActorEntry>,
    #[serde(default, rename = "step")]
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("failed to parse session script")
    }
}

/// Directory entry for one username.
#[derive(Clone, Debug, Deserialize)]
pub struct ActorEntry {
    pub role: Role,
    pub department: String,
}

#[derive(Debug, Deserialize)]
pub struct ScriptStep {
    /// The step is expected to be rejected; a success counts as a failure.
    #[serde(default)]
    pub expect_failure: bool,
    #[serde(flatten)]
    pub step: Step,
}

/// One scripted command. `case` fields accept either a case id registered
/// earlier in the script or a raw FIR hash.
#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Step {
    RegisterCase {
        actor: String,
        case_id: String,
        #[serde(default)]
        complainant: String,
        #[serde(default)]
        sections: String,
        #[serde(default)]
        location: String,
        #[serde(default)]
        notes: String,
    },
    AttachEvidence {
        actor: String,
        case: String,
        description: String,
        #[serde(default)]
        evidence_type: String,
        #[serde(default)]
        collecting_officer: String,
        #[serde(default)]
        storage_location: String,
        #[serde(default)]
        notes: String,
    },
    RequestAccess {
        actor: String,
        case: String,
    },
    /// Approve the oldest matching request in the actor's inbox.
    Approve {
        actor: String,
        #[serde(default)]
        case: Option<String>,
        #[serde(default)]
        requester: Option<String>,
    },
    Transfer {
        actor: String,
        case: String,
        new_dept: String,
        new_officer: String,
    },
    ViewCases {
        actor: String,
    },
    Inbox {
        actor: String,
    },
    MapCase {
        actor: String,
        case: String,
    },
    Validate,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterCase { .. } => "register_case",
            Self::AttachEvidence { .. } => "attach_evidence",
            Self::RequestAccess { .. } => "request_access",
            Self::Approve { .. } => "approve",
            Self::Transfer { .. } => "transfer",
            Self::ViewCases { .. } => "view_cases",
            Self::Inbox { .. } => "inbox",
            Self::MapCase { .. } => "map_case",
            Self::Validate => "validate",
        }
    }

    pub fn actor(&self) -> Option<&str> {
        match self {
            Self::RegisterCase { actor, .. }
            | Self::AttachEvidence { actor, .. }
            | Self::RequestAccess { actor, .. }
            | Self::Approve { actor, .. }
            | Self::Transfer { actor, .. }
            | Self::ViewCases { actor }
            | Self::Inbox { actor }
            | Self::MapCase { actor, .. } => Some(actor.as_str()),
            Self::Validate => None,
        }
    }
}

/// What a successful step produced.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Appended { block: Arc<Block> },
    Requested { request: RequestId, case: BlockHash },
    Cases { overview: Box<CaseOverview> },
    Inbox { requests: Vec<PendingRequest> },
    Timeline { timeline: CaseTimeline },
    Validated { report: ValidationReport },
}

/// Per-step record of a finished session.
#[derive(Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub command: &'static str,
    pub actor: Option<String>,
    pub expected_failure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    /// Whether the step did what the script said it would.
    pub fn as_expected(&self) -> bool {
        self.error.is_some() == self.expected_failure
    }
}

/// A registry plus the script's actor directory and case-id labels.
pub struct Session {
    registry: CaseRegistry,
    actors: BTreeMap<String, Identity>,
    cases: BTreeMap<String, BlockHash>,
}

impl Session {
    pub fn new(registry: CaseRegistry, actors: BTreeMap<String, ActorEntry>) -> Self {
        let actors = actors
            .into_iter()
            .map(|(username, entry)| {
                let identity = Identity::new(username.clone(), entry.role, entry.department);
                (username, identity)
            })
            .collect();
        Self {
            registry,
            actors,
            cases: BTreeMap::new(),
        }
    }

    pub fn registry(&self) -> &CaseRegistry {
        &self.registry
    }

    /// Run every step, recording failures instead of stopping at them.
    pub fn run(&mut self, steps: Vec<ScriptStep>) -> Vec<StepReport> {
        steps
            .into_iter()
            .enumerate()
            .map(|(index, scripted)| {
                let command = scripted.step.name();
                let actor = scripted.step.actor().map(str::to_string);
                let (outcome, error) = match self.execute(scripted.step) {
                    Ok(outcome) => (Some(outcome), None),
                    Err(e) => (None, Some(format!("{e:#}"))),
                };
                StepReport {
                    index: index + 1,
                    command,
                    actor,
                    expected_failure: scripted.expect_failure,
                    outcome,
                    error,
                }
            })
            .collect()
    }

    fn execute(&mut self, step: Step) -> anyhow::Result<Outcome> {
        match step {
            Step::RegisterCase {
                actor,
                case_id,
                complainant,
                sections,
                location,
                notes,
            } => {
                let actor = self.actor(&actor)?;
                let draft = FirDraft::new(case_id.clone())
                    .with_complainant(complainant)
                    .with_sections(sections)
                    .with_location(location)
                    .with_notes(notes);
                let block = self.registry.register_case(&actor, draft)?;
                self.cases.insert(case_id, block.hash);
                Ok(Outcome::Appended { block })
            }
            Step::AttachEvidence {
                actor,
                case,
                description,
                evidence_type,
                collecting_officer,
                storage_location,
                notes,
            } => {
                let actor = self.actor(&actor)?;
                let linked = match self.cases.get(&case) {
                    Some(hash) => hash.to_hex(),
                    None => case,
                };
                let draft = EvidenceDraft::new(linked, description)
                    .with_evidence_type(evidence_type)
                    .with_collecting_officer(collecting_officer)
                    .with_storage_location(storage_location)
                    .with_notes(notes);
                let block = self.registry.attach_evidence(&actor, draft)?;
                Ok(Outcome::Appended { block })
            }
            Step::RequestAccess { actor, case } => {
                let actor = self.actor(&actor)?;
                let case = self.case(&case)?;
                let request = self.registry.request_access(&actor, &case)?;
                Ok(Outcome::Requested { request, case })
            }
            Step::Approve {
                actor,
                case,
                requester,
            } => {
                let actor = self.actor(&actor)?;
                let case = case.map(|c| self.case(&c)).transpose()?;
                let inbox = self.registry.inbox(&actor)?;
                let request = inbox
                    .iter()
                    .rev()
                    .find(|r| {
                        case.map_or(true, |c| r.fir_hash == c)
                            && requester
                                .as_deref()
                                .map_or(true, |u| r.requester.username == u)
                    })
                    .ok_or_else(|| anyhow!("no matching request in {}'s inbox", actor.username))?;
                let block = self.registry.approve_request(&actor, &request.id)?;
                Ok(Outcome::Appended { block })
            }
            Step::Transfer {
                actor,
                case,
                new_dept,
                new_officer,
            } => {
                let actor = self.actor(&actor)?;
                let case = self.case(&case)?;
                let block = self
                    .registry
                    .transfer_case(&actor, &case, &new_dept, &new_officer)?;
                Ok(Outcome::Appended { block })
            }
            Step::ViewCases { actor } => {
                let actor = self.actor(&actor)?;
                let overview = self.registry.cases(&actor)?;
                Ok(Outcome::Cases {
                    overview: Box::new(overview),
                })
            }
            Step::Inbox { actor } => {
                let actor = self.actor(&actor)?;
                let requests = self.registry.inbox(&actor)?;
                Ok(Outcome::Inbox { requests })
            }
            Step::MapCase { actor, case } => {
                let actor = self.actor(&actor)?;
                let case = self.case(&case)?;
                let timeline = self.registry.case_timeline(&actor, &case)?;
                Ok(Outcome::Timeline { timeline })
            }
            Step::Validate => {
                let report = self.registry.validate_chain()?;
                if !report.is_valid() {
                    bail!("ledger failed validation with {} violation(s)", report.violations.len());
                }
                Ok(Outcome::Validated { report })
            }
        }
    }

    fn actor(&self, username: &str) -> anyhow::Result<Identity> {
        self.actors
            .get(username)
            .cloned()
            .ok_or_else(|| anyhow!("unknown actor '{username}'"))
    }

    fn case(&self, label: &str) -> anyhow::Result<BlockHash> {
        match self.cases.get(label) {
            Some(hash) => Ok(*hash),
            None => BlockHash::from_hex(label).with_context(|| {
                format!("'{label}' is neither a registered case id nor a FIR hash")
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use fir_sdk::{Access, RegistryConfig};

    use super::*;

    fn session(script: &Script) -> Session {
        let mut config = RegistryConfig::default();
        config.ledger.difficulty = 1;
        Session::new(CaseRegistry::new(config).unwrap(), script.actors.clone())
    }

    #[test]
    fn demo_script_runs_as_expected() {
        let script = Script::parse(DEMO_SCRIPT).unwrap();
        let mut session = session(&script);
        let reports = session.run(script.steps);

        for report in &reports {
            assert!(
                report.as_expected(),
                "step {} {}: {:?}",
                report.index,
                report.command,
                report.error
            );
        }

        let replay = session.registry().replay().unwrap();
        assert_eq!(replay.cases.len(), 1);
        let case = replay.cases.values().next().unwrap();
        assert_eq!(case.current_owner_department, "Cyber Crime");
        assert!(case.is_granted_to("CBI"));
        assert_eq!(case.evidence.len(), 1);
        assert_eq!(replay.stats.dropped_dangling, 1);
    }

    #[test]
    fn granted_view_follows_approval() {
        let script = Script::parse(DEMO_SCRIPT).unwrap();
        let mut session = session(&script);
        let reports = session.run(script.steps);

        // Steps 4 and 8 are the constable's dashboard before and after approval.
        let visible = |index: usize| match &reports[index - 1].outcome {
            Some(Outcome::Cases { overview }) => overview
                .visibility
                .visible
                .iter()
                .filter(|v| v.access == Access::Granted)
                .count(),
            other => panic!("unexpected outcome {other:?}"),
        };
        assert_eq!(visible(4), 0);
        assert_eq!(visible(8), 1);
    }

    #[test]
    fn unknown_actor_is_a_step_error() {
        let script = Script::parse(
            r#"
            [[step]]
            command = "view_cases"
            actor = "nobody"
            "#,
        )
        .unwrap();
        let mut session = session(&script);
        let reports = session.run(script.steps);
        assert_eq!(reports[0].error.as_deref(), Some("unknown actor 'nobody'"));
        assert!(!reports[0].as_expected());
    }

    #[test]
    fn unknown_role_fails_to_parse() {
        let err = Script::parse(
            r#"
            [actors.x]
            role = "Inspector"
            department = "A"
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn unexpected_success_is_flagged() {
        let script = Script::parse(
            r#"
            [actors.si]
            role = "SI"
            department = "A"

            [[step]]
            command = "register_case"
            actor = "si"
            case_id = "F1"
            expect_failure = true
            "#,
        )
        .unwrap();
        let mut session = session(&script);
        let reports = session.run(script.steps);
        assert!(reports[0].error.is_none());
        assert!(!reports[0].as_expected());
    }
}
