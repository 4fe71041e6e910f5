use std::collections::BTreeSet;

use fir_types::Role;
use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Which actions each role may run.
///
/// Serialized with the directory's role names as keys:
///
/// ```toml
/// SI = ["register_case", "attach_evidence"]
/// Constable = ["request_access"]
/// Judge = ["view_cases", "map_case"]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityTable {
    #[serde(rename = "SI", default)]
    pub sub_inspector: BTreeSet<Action>,
    #[serde(rename = "Constable", default)]
    pub constable: BTreeSet<Action>,
    #[serde(rename = "Judge", default)]
    pub judge: BTreeSet<Action>,
}

impl CapabilityTable {
    /// A table that permits nothing.
    pub fn empty() -> Self {
        Self {
            sub_inspector: BTreeSet::new(),
            constable: BTreeSet::new(),
            judge: BTreeSet::new(),
        }
    }

    pub fn actions_for(&self, role: Role) -> &BTreeSet<Action> {
        match role {
            Role::SubInspector => &self.sub_inspector,
            Role::Constable => &self.constable,
            Role::Judge => &self.judge,
        }
    }

    pub fn permits(&self, role: Role, action: Action) -> bool {
        self.actions_for(role).contains(&action)
    }

    /// Builder-style grant.
    pub fn allow(mut self, role: Role, action: Action) -> Self {
        let set = match role {
            Role::SubInspector => &mut self.sub_inspector,
            Role::Constable => &mut self.constable,
            Role::Judge => &mut self.judge,
        };
        set.insert(action);
        self
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        use Action::*;
        Self {
            sub_inspector: [
                RegisterCase,
                AttachEvidence,
                RequestAccess,
                ApproveRequest,
                TransferCase,
                ViewCases,
                ViewInbox,
            ]
            .into_iter()
            .collect(),
            constable: [RequestAccess, ViewCases, ViewInbox].into_iter().collect(),
            judge: [ViewCases, ViewInbox, MapCase].into_iter().collect(),
        }
    }
}

/// Configuration for the command gate pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// When `true`, every stage is skipped and every command is accepted.
    /// Intended for fixtures and local experiments only.
    pub permissive: bool,
    /// Role-to-action permissions checked by the capability stage.
    pub capabilities: CapabilityTable,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            permissive: false,
            capabilities: CapabilityTable::default(),
        }
    }
}

impl GateConfig {
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_roles() {
        let table = CapabilityTable::default();
        for action in Action::ALL {
            assert_eq!(
                table.permits(Role::SubInspector, action),
                action != Action::MapCase,
                "SI / {action}"
            );
        }
        assert!(table.permits(Role::Constable, Action::RequestAccess));
        assert!(!table.permits(Role::Constable, Action::RegisterCase));
        assert!(!table.permits(Role::Constable, Action::ApproveRequest));
        assert!(table.permits(Role::Judge, Action::MapCase));
        assert!(!table.permits(Role::Judge, Action::TransferCase));
    }

    #[test]
    fn table_loads_from_toml() {
        let table: CapabilityTable = toml::from_str(
            r#"
            SI = ["register_case"]
            Judge = ["map_case", "view_cases"]
            "#,
        )
        .unwrap();
        assert!(table.permits(Role::SubInspector, Action::RegisterCase));
        assert!(!table.permits(Role::SubInspector, Action::TransferCase));
        assert!(table.actions_for(Role::Constable).is_empty());
        assert!(table.permits(Role::Judge, Action::ViewCases));
    }

    #[test]
    fn missing_gate_section_fields_fall_back_to_defaults() {
        let config: GateConfig = toml::from_str("permissive = true").unwrap();
        assert!(config.permissive);
        assert_eq!(config.capabilities, CapabilityTable::default());
    }

    #[test]
    fn allow_extends_a_table() {
        let table = CapabilityTable::empty().allow(Role::Constable, Action::AttachEvidence);
        assert!(table.permits(Role::Constable, Action::AttachEvidence));
        assert!(!table.permits(Role::SubInspector, Action::AttachEvidence));
    }
}
