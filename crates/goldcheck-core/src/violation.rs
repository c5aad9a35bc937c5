//! Violation records produced by the individual checks.

use serde::Serialize;
use std::fmt;

/// Which contract a fixture broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    /// Required metadata file absent. Process-global, reported at most once.
    Missing,
    /// Bytes differ from the canonical serialization, or do not parse at all.
    NotCanonical,
    /// Schema file absent or unusable, or the document fails validation.
    SchemaInvalid,
    /// A string leaf looks like a run-specific artifact.
    NonDeterministic,
}

impl ViolationKind {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Missing => "MISSING",
            Self::NotCanonical => "NOT_CANONICAL",
            Self::SchemaInvalid => "SCHEMA_INVALID",
            Self::NonDeterministic => "NON_DETERMINISTIC",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One finding. `detail` is everything after the `KIND: ` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub detail: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn missing(rel_path: &str) -> Self {
        Self::new(ViolationKind::Missing, rel_path)
    }

    /// The stable, grep-able message: `<TAG>: <detail>`.
    pub fn message(&self) -> String {
        format!("{}: {}", self.kind.tag(), self.detail)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.tag(), self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefixes_stable_tag() {
        let violation = Violation::new(ViolationKind::NotCanonical, "goldens/Script.json");
        assert_eq!(violation.message(), "NOT_CANONICAL: goldens/Script.json");
        assert_eq!(violation.to_string(), violation.message());
    }

    #[test]
    fn kind_serializes_as_tag() {
        let encoded = serde_json::to_string(&ViolationKind::NonDeterministic).expect("serialize");
        assert_eq!(encoded, "\"NON_DETERMINISTIC\"");
    }
}
