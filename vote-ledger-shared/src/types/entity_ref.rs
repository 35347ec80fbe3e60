use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a voter or a voteable without coupling to a concrete type.
///
/// Two references are equal when both `kind` and `id` match, so the same
/// identifier used by two different kinds addresses two different entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: String,
    pub id: String,
}

impl EntityRef {
    /// Creates a reference from a kind name and any displayable identifier.
    pub fn new(kind: impl Into<String>, id: impl ToString) -> Self {
        Self {
            kind: kind.into(),
            id: id.to_string(),
        }
    }

    /// Returns true if this reference addresses an entity of `kind`.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}
