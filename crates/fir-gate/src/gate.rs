use std::time::{Duration, Instant};

use fir_crypto::ContentHasher;
use fir_types::BlockHash;

use crate::config::GateConfig;
use crate::error::GateError;
use crate::stage::{CommandRequest, GateContext, GateStage, StageDecision, StageResult};
use crate::stages::{CapabilityStage, ValidationStage};

// ---------------------------------------------------------------------------
// GateResult
// ---------------------------------------------------------------------------

/// Final decision of the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Rejected { stage: String, reason: String },
}

impl Decision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// The outcome of running a command through the full gate pipeline.
#[derive(Clone, Debug)]
pub struct GateResult {
    pub decision: Decision,
    /// BLAKE3 hash of the capability table that was active.
    pub policy_hash: BlockHash,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
    pub elapsed: Duration,
}

impl GateResult {
    pub fn is_accepted(&self) -> bool {
        self.decision.is_accepted()
    }
}

// ---------------------------------------------------------------------------
// CommandGate
// ---------------------------------------------------------------------------

/// The command gate: a pipeline of stages every registry command passes
/// through before it touches the ledger or the pending queue.
pub struct CommandGate {
    stages: Vec<Box<dyn GateStage>>,
    config: GateConfig,
}

impl CommandGate {
    /// Create a gate with an empty pipeline.
    pub fn new(config: GateConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Create a gate with the default pipeline: Capability -> Validation
    pub fn with_default_stages(config: GateConfig) -> Self {
        let mut gate = Self::new(config);
        gate.add_stage(Box::new(CapabilityStage));
        gate.add_stage(Box::new(ValidationStage));
        gate
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn GateStage>) {
        self.stages.push(stage);
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Evaluate a command through the full pipeline.
    ///
    /// The pipeline is **fail-fast**: the first stage that fails stops
    /// evaluation and produces a `Rejected` decision.
    pub fn evaluate(&self, request: &CommandRequest) -> Result<GateResult, GateError> {
        let pipeline_start = Instant::now();
        let policy_hash = self.compute_policy_hash();

        if self.config.permissive {
            return Ok(GateResult {
                decision: Decision::Accepted,
                policy_hash,
                stage_results: Vec::new(),
                elapsed: pipeline_start.elapsed(),
            });
        }
        if self.stages.is_empty() {
            return Err(GateError::Config(
                "gate has no stages and is not permissive".into(),
            ));
        }

        let mut context = GateContext::new(&self.config.capabilities);
        let mut stage_results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let stage_start = Instant::now();
            let decision = stage.evaluate(request, &context)?;

            let result = StageResult {
                stage_name: stage.name().to_string(),
                passed: decision.is_pass(),
                reason: match &decision {
                    StageDecision::Pass => None,
                    StageDecision::Fail { reason } => Some(reason.clone()),
                },
                elapsed: stage_start.elapsed(),
            };
            stage_results.push(result.clone());
            context.previous_stages.push(result);

            if let StageDecision::Fail { reason } = decision {
                tracing::debug!(
                    actor = %request.actor.username,
                    action = %request.action,
                    stage = stage.name(),
                    %reason,
                    "command rejected by gate"
                );
                return Ok(GateResult {
                    decision: Decision::Rejected {
                        stage: stage.name().to_string(),
                        reason,
                    },
                    policy_hash,
                    stage_results,
                    elapsed: pipeline_start.elapsed(),
                });
            }
        }

        Ok(GateResult {
            decision: Decision::Accepted,
            policy_hash,
            stage_results,
            elapsed: pipeline_start.elapsed(),
        })
    }

    /// Evaluate and turn a rejection into the matching [`GateError`].
    ///
    /// Capability failures become `CapabilityDenied`; any other stage's
    /// failure becomes `Validation`.
    pub fn authorize(&self, request: &CommandRequest) -> Result<GateResult, GateError> {
        let result = self.evaluate(request)?;
        match &result.decision {
            Decision::Accepted => Ok(result),
            Decision::Rejected { stage, .. } if stage == "capability" => {
                Err(GateError::CapabilityDenied {
                    role: request.actor.role,
                    action: request.action,
                })
            }
            Decision::Rejected { reason, .. } => Err(GateError::Validation(reason.clone())),
        }
    }

    fn compute_policy_hash(&self) -> BlockHash {
        ContentHasher::POLICY
            .hash_json(&self.config.capabilities)
            .unwrap_or_else(|_| BlockHash::zero())
    }
}

#[cfg(test)]
mod tests {
    use fir_types::{Identity, Role};
    use proptest::prelude::*;

    use super::*;
    use crate::action::Action;
    use crate::config::CapabilityTable;

    fn gate() -> CommandGate {
        CommandGate::with_default_stages(GateConfig::default())
    }

    fn register(actor: Identity, case_id: &str) -> CommandRequest {
        CommandRequest::new(actor, Action::RegisterCase).with_input("case_id", case_id)
    }

    #[test]
    fn si_registration_is_accepted() {
        let result = gate()
            .evaluate(&register(Identity::sub_inspector("si", "A"), "FIR-1"))
            .unwrap();
        assert!(result.is_accepted());
        assert_eq!(result.stage_results.len(), 2);
        assert!(result.stage_results.iter().all(|s| s.passed));
    }

    #[test]
    fn capability_runs_before_validation() {
        let result = gate()
            .evaluate(&register(Identity::constable("c", "A"), ""))
            .unwrap();
        assert_eq!(result.stage_results.len(), 1);
        assert!(matches!(
            result.decision,
            Decision::Rejected { ref stage, .. } if stage == "capability"
        ));
    }

    #[test]
    fn authorize_maps_rejections_to_errors() {
        let gate = gate();
        assert_eq!(
            gate.authorize(&register(Identity::judge("j", "Court"), "FIR-1"))
                .unwrap_err(),
            GateError::CapabilityDenied {
                role: Role::Judge,
                action: Action::RegisterCase
            }
        );
        assert_eq!(
            gate.authorize(&register(Identity::sub_inspector("si", "A"), " "))
                .unwrap_err(),
            GateError::Validation("case_id must not be empty".into())
        );
    }

    #[test]
    fn permissive_gate_skips_stages() {
        let gate = CommandGate::with_default_stages(GateConfig::permissive());
        let result = gate
            .evaluate(&register(Identity::constable("c", "A"), ""))
            .unwrap();
        assert!(result.is_accepted());
        assert!(result.stage_results.is_empty());
    }

    #[test]
    fn empty_pipeline_is_a_config_error() {
        let gate = CommandGate::new(GateConfig::default());
        assert!(matches!(
            gate.evaluate(&register(Identity::sub_inspector("si", "A"), "FIR-1")),
            Err(GateError::Config(_))
        ));
    }

    #[test]
    fn policy_hash_tracks_the_table() {
        let a = gate()
            .evaluate(&register(Identity::sub_inspector("si", "A"), "F"))
            .unwrap();
        let custom = GateConfig {
            capabilities: CapabilityTable::empty().allow(Role::SubInspector, Action::RegisterCase),
            permissive: false,
        };
        let b = CommandGate::with_default_stages(custom)
            .evaluate(&register(Identity::sub_inspector("si", "A"), "F"))
            .unwrap();
        assert!(b.is_accepted());
        assert_ne!(a.policy_hash, b.policy_hash);
        assert!(!a.policy_hash.is_zero());
    }

    fn role() -> impl Strategy<Value = Role> {
        prop_oneof![
            Just(Role::SubInspector),
            Just(Role::Constable),
            Just(Role::Judge)
        ]
    }

    proptest! {
        #[test]
        fn gate_agrees_with_capability_table(r in role(), i in 0usize..8) {
            let action = Action::ALL[i];
            let request = CommandRequest::new(Identity::new("u", r, "D"), action)
                .with_input("case_id", "x")
                .with_input("linked_fir_hash", "x")
                .with_input("description", "x")
                .with_input("new_dept", "x")
                .with_input("new_officer_username", "x");
            let accepted = gate().evaluate(&request).unwrap().is_accepted();
            prop_assert_eq!(accepted, CapabilityTable::default().permits(r, action));
        }
    }
}
