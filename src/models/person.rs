use serde::{Deserialize, Serialize};

/// Identity matched by the identity-graph provider.
///
/// Both fields may be empty when the provider answered with a face box but
/// no named match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub name: String,
    pub external_id: String,
}

impl PersonRecord {
    pub fn new(name: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external_id: external_id.into(),
        }
    }

    /// Provider found a face but matched nobody.
    pub fn is_empty_match(&self) -> bool {
        self.name.is_empty() && self.external_id.is_empty()
    }
}

/// Terminal answer of a recognition poll.
///
/// `Unresolved` means the attempt budget ran out; it is never used for a
/// provider-side empty match, which is `Resolved` with an empty record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "person", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(PersonRecord),
    Unresolved,
}

impl Resolution {
    pub fn person(&self) -> Option<&PersonRecord> {
        match self {
            Resolution::Resolved(person) => Some(person),
            Resolution::Unresolved => None,
        }
    }
}
