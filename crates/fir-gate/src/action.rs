use std::fmt;

use serde::{Deserialize, Serialize};

/// A command an actor may attempt against the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    RegisterCase,
    AttachEvidence,
    RequestAccess,
    ApproveRequest,
    TransferCase,
    ViewCases,
    ViewInbox,
    MapCase,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::RegisterCase,
        Action::AttachEvidence,
        Action::RequestAccess,
        Action::ApproveRequest,
        Action::TransferCase,
        Action::ViewCases,
        Action::ViewInbox,
        Action::MapCase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegisterCase => "register_case",
            Self::AttachEvidence => "attach_evidence",
            Self::RequestAccess => "request_access",
            Self::ApproveRequest => "approve_request",
            Self::TransferCase => "transfer_case",
            Self::ViewCases => "view_cases",
            Self::ViewInbox => "view_inbox",
            Self::MapCase => "map_case",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
