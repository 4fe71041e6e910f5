use std::path::Path;

use fir_crypto::ProofOfWork;
use fir_gate::GateConfig;
use fir_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration for a [`CaseRegistry`](crate::CaseRegistry).
///
/// Every section is optional in TOML; missing sections and keys take their
/// defaults.
///
/// ```toml
/// [ledger]
/// difficulty = 3
///
/// [gate.capabilities]
/// Constable = ["request_access", "view_cases", "view_inbox"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub ledger: LedgerConfig,
    pub gate: GateConfig,
}

impl RegistryConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or fails
    /// validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.difficulty > ProofOfWork::MAX_DIFFICULTY {
            return Err(ConfigError::Validation(format!(
                "ledger.difficulty {} exceeds the maximum of {}",
                self.ledger.difficulty,
                ProofOfWork::MAX_DIFFICULTY
            )));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use fir_gate::{Action, CapabilityTable};
    use fir_types::Role;

    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = RegistryConfig::from_toml("").unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.ledger.difficulty, 2);
        assert_eq!(config.gate.capabilities, CapabilityTable::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = RegistryConfig::from_toml(
            r#"
            [ledger]
            difficulty = 1

            [gate.capabilities]
            Constable = ["request_access", "attach_evidence"]
            "#,
        )
        .unwrap();
        assert_eq!(config.ledger.difficulty, 1);
        assert!(config
            .gate
            .capabilities
            .permits(Role::Constable, Action::AttachEvidence));
        // Unlisted roles in a present table get nothing.
        assert!(config.gate.capabilities.actions_for(Role::Judge).is_empty());
        assert!(!config.gate.permissive);
    }

    #[test]
    fn toml_round_trip() {
        let config = RegistryConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(RegistryConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn oversized_difficulty_is_rejected() {
        let err = RegistryConfig::from_toml("[ledger]\ndifficulty = 65").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn unknown_action_fails_to_parse() {
        let err = RegistryConfig::from_toml("[gate.capabilities]\nSI = [\"delete_case\"]")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ledger]\ndifficulty = 0").unwrap();
        let config = RegistryConfig::from_file(file.path()).unwrap();
        assert_eq!(config.ledger.difficulty, 0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RegistryConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
