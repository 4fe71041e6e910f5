use serde::{Deserialize, Serialize};

/// User-supplied fields of a new FIR.
///
/// The originating department and officer come from the acting identity,
/// not from the draft.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirDraft {
    pub case_id: String,
    pub complainant: String,
    pub sections: String,
    pub location: String,
    pub notes: String,
}

impl FirDraft {
    pub fn new(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            ..Default::default()
        }
    }

    pub fn with_complainant(mut self, complainant: impl Into<String>) -> Self {
        self.complainant = complainant.into();
        self
    }

    pub fn with_sections(mut self, sections: impl Into<String>) -> Self {
        self.sections = sections.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// User-supplied fields of an evidence entry.
///
/// `linked_fir_hash` is kept as the raw hex the user typed; the registry
/// parses it but does not check that it names a case.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceDraft {
    pub linked_fir_hash: String,
    pub evidence_type: String,
    pub description: String,
    pub collecting_officer: String,
    pub storage_location: String,
    pub notes: String,
}

impl EvidenceDraft {
    pub fn new(linked_fir_hash: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            linked_fir_hash: linked_fir_hash.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_evidence_type(mut self, evidence_type: impl Into<String>) -> Self {
        self.evidence_type = evidence_type.into();
        self
    }

    pub fn with_collecting_officer(mut self, officer: impl Into<String>) -> Self {
        self.collecting_officer = officer.into();
        self
    }

    pub fn with_storage_location(mut self, location: impl Into<String>) -> Self {
        self.storage_location = location.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}
