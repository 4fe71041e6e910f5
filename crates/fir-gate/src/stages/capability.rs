use crate::error::GateError;
use crate::stage::{CommandRequest, GateContext, GateStage, StageDecision};

/// Capability verification stage.
///
/// Checks the actor's role against the configured capability table.
pub struct CapabilityStage;

impl GateStage for CapabilityStage {
    fn name(&self) -> &str {
        "capability"
    }

    fn evaluate(
        &self,
        request: &CommandRequest,
        context: &GateContext<'_>,
    ) -> Result<StageDecision, GateError> {
        let role = request.actor.role;
        if context.capabilities.permits(role, request.action) {
            return Ok(StageDecision::Pass);
        }
        Ok(StageDecision::Fail {
            reason: format!("{role} may not {}", request.action),
        })
    }
}
