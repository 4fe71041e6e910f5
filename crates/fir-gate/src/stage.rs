use std::collections::BTreeMap;
use std::time::Duration;

use fir_types::Identity;
use serde::Serialize;

use crate::action::Action;
use crate::config::CapabilityTable;
use crate::error::GateError;

// ---------------------------------------------------------------------------
// CommandRequest
// ---------------------------------------------------------------------------

/// A command about to be dispatched, as seen by the gate.
///
/// Inputs are the raw user-supplied strings the command will use; the gate
/// only checks their presence, not their meaning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandRequest {
    pub actor: Identity,
    pub action: Action,
    pub inputs: BTreeMap<String, String>,
}

impl CommandRequest {
    pub fn new(actor: Identity, action: Action) -> Self {
        Self {
            actor,
            action,
            inputs: BTreeMap::new(),
        }
    }

    /// Builder-style input setter.
    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    /// An input's value, or `""` if it was never supplied.
    pub fn input(&self, name: &str) -> &str {
        self.inputs.get(name).map(String::as_str).unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// StageDecision
// ---------------------------------------------------------------------------

/// The outcome of a single gate stage evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageDecision {
    /// The stage passed; proceed to the next stage.
    Pass,
    /// The stage failed; the command is rejected.
    Fail { reason: String },
}

impl StageDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }
}

// ---------------------------------------------------------------------------
// StageResult
// ---------------------------------------------------------------------------

/// Recorded result from a completed stage evaluation.
#[derive(Clone, Debug)]
pub struct StageResult {
    pub stage_name: String,
    pub passed: bool,
    /// Populated on failure.
    pub reason: Option<String>,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// GateContext
// ---------------------------------------------------------------------------

/// Contextual information available to every gate stage.
pub struct GateContext<'a> {
    pub capabilities: &'a CapabilityTable,
    /// Results from stages that have already run in this evaluation.
    pub previous_stages: Vec<StageResult>,
}

impl<'a> GateContext<'a> {
    pub fn new(capabilities: &'a CapabilityTable) -> Self {
        Self {
            capabilities,
            previous_stages: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// GateStage trait
// ---------------------------------------------------------------------------

/// A single evaluation stage in the gate pipeline.
///
/// Object-safe and `Send + Sync` so stages can live in a
/// `Vec<Box<dyn GateStage>>` inside a shared registry.
pub trait GateStage: Send + Sync {
    /// Human-readable name of this stage (e.g., "validation", "capability").
    fn name(&self) -> &str;

    fn evaluate(
        &self,
        request: &CommandRequest,
        context: &GateContext<'_>,
    ) -> Result<StageDecision, GateError>;
}
