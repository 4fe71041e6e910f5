use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Rank of the acting officer.
///
/// The identity directory hands roles over as strings (`"SI"`,
/// `"Constable"`, `"Judge"`); anything else fails to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Sub-inspector: registers cases, adds evidence, approves, transfers.
    #[serde(rename = "SI")]
    SubInspector,
    Constable,
    /// Read-only view over every case plus the case mapper.
    Judge,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::SubInspector, Role::Constable, Role::Judge];

    /// The directory's string form of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubInspector => "SI",
            Self::Constable => "Constable",
            Self::Judge => "Judge",
        }
    }

    /// Police roles see cases through the owned/granted/other partition.
    pub fn is_police(&self) -> bool {
        matches!(self, Self::SubInspector | Self::Constable)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SI" => Ok(Self::SubInspector),
            "Constable" => Ok(Self::Constable),
            "Judge" => Ok(Self::Judge),
            other => Err(TypeError::UnknownRole(other.to_string())),
        }
    }
}

/// The acting party on a command, as supplied by the identity directory.
///
/// The ledger trusts this verbatim: there is no authentication here, only
/// authorization filters keyed on `role` and `department`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
    pub department: String,
}

impl Identity {
    pub fn new(username: impl Into<String>, role: Role, department: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role,
            department: department.into(),
        }
    }

    pub fn sub_inspector(username: impl Into<String>, department: impl Into<String>) -> Self {
        Self::new(username, Role::SubInspector, department)
    }

    pub fn constable(username: impl Into<String>, department: impl Into<String>) -> Self {
        Self::new(username, Role::Constable, department)
    }

    pub fn judge(username: impl Into<String>, department: impl Into<String>) -> Self {
        Self::new(username, Role::Judge, department)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.role, self.username, self.department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_directory_strings() {
        assert_eq!("SI".parse::<Role>().unwrap(), Role::SubInspector);
        assert_eq!("Constable".parse::<Role>().unwrap(), Role::Constable);
        assert_eq!(" Judge ".parse::<Role>().unwrap(), Role::Judge);
    }

    #[test]
    fn unknown_role_rejected() {
        let err = "Inspector".parse::<Role>().unwrap_err();
        assert_eq!(err, TypeError::UnknownRole("Inspector".into()));
    }

    #[test]
    fn role_serde_uses_directory_names() {
        let json = serde_json::to_string(&Role::SubInspector).unwrap();
        assert_eq!(json, "\"SI\"");
        let back: Role = serde_json::from_str("\"Constable\"").unwrap();
        assert_eq!(back, Role::Constable);
    }

    #[test]
    fn police_roles() {
        assert!(Role::SubInspector.is_police());
        assert!(Role::Constable.is_police());
        assert!(!Role::Judge.is_police());
    }

    #[test]
    fn identity_display() {
        let id = Identity::sub_inspector("si_state", "State Police");
        assert_eq!(id.to_string(), "SI si_state (State Police)");
    }
}
