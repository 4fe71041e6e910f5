use crate::action::Action;
use crate::error::GateError;
use crate::stage::{CommandRequest, GateContext, GateStage, StageDecision};

/// Structural validation stage.
///
/// Checks that the inputs each action cannot do without are present and
/// not blank.
pub struct ValidationStage;

impl ValidationStage {
    /// Inputs that must be non-blank for `action`.
    pub fn required_inputs(action: Action) -> &'static [&'static str] {
        match action {
            Action::RegisterCase => &["case_id"],
            Action::AttachEvidence => &["linked_fir_hash", "description"],
            Action::TransferCase => &["new_dept", "new_officer_username"],
            _ => &[],
        }
    }
}

impl GateStage for ValidationStage {
    fn name(&self) -> &str {
        "validation"
    }

    fn evaluate(
        &self,
        request: &CommandRequest,
        _context: &GateContext<'_>,
    ) -> Result<StageDecision, GateError> {
        for name in Self::required_inputs(request.action) {
            if request.input(name).trim().is_empty() {
                return Ok(StageDecision::Fail {
                    reason: format!("{name} must not be empty"),
                });
            }
        }
        Ok(StageDecision::Pass)
    }
}

#[cfg(test)]
mod tests {
    use fir_types::Identity;

    use super::*;
    use crate::config::CapabilityTable;

    fn evaluate(request: &CommandRequest) -> StageDecision {
        let table = CapabilityTable::default();
        ValidationStage
            .evaluate(request, &GateContext::new(&table))
            .unwrap()
    }

    #[test]
    fn blank_case_id_fails() {
        let request = CommandRequest::new(Identity::sub_inspector("si", "A"), Action::RegisterCase)
            .with_input("case_id", "   ");
        assert_eq!(
            evaluate(&request),
            StageDecision::Fail {
                reason: "case_id must not be empty".into()
            }
        );
    }

    #[test]
    fn missing_input_counts_as_blank() {
        let request = CommandRequest::new(Identity::sub_inspector("si", "A"), Action::TransferCase)
            .with_input("new_dept", "CBI");
        assert!(evaluate(&request).is_fail());
    }

    #[test]
    fn actions_without_inputs_pass() {
        let request = CommandRequest::new(Identity::judge("j", "Court"), Action::ViewCases);
        assert!(evaluate(&request).is_pass());
    }
}
