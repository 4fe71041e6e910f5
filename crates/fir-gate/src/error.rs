use fir_types::Role;

use crate::action::Action;

/// Errors that can occur during gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// A required command input is missing or blank.
    #[error("validation error: {0}")]
    Validation(String),

    /// The actor's role is not permitted to run the action.
    #[error("capability denied: {role} may not {action}")]
    CapabilityDenied { role: Role, action: Action },

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}
