//! Field-name exemptions from determinism checks, per schema.
//!
//! File shape: `{"<SchemaId>": {"<field>": <any>, ...}, ...}`. Only the
//! presence of a field key matters; its value is free-form metadata such as
//! a reason string.

use crate::error::display_path;
use crate::schema::SchemaId;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum AllowlistError {
    #[error("failed to read allowlist: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid allowlist json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("allowlist {path}: {message}")]
    Shape { path: String, message: String },
}

/// Exempted field names keyed by schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    fields: BTreeMap<SchemaId, BTreeSet<String>>,
}

impl Allowlist {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from `path`. A missing file is an empty allowlist.
    pub fn load(path: &Path) -> Result<Self, AllowlistError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %display_path(path), "no allowlist; nothing exempted");
                return Ok(Self::empty());
            }
            Err(source) => {
                return Err(AllowlistError::Read {
                    path: display_path(path),
                    source,
                });
            }
        };
        let payload: Value =
            serde_json::from_slice(&bytes).map_err(|source| AllowlistError::Parse {
                path: display_path(path),
                source,
            })?;
        Self::from_value(&payload).map_err(|message| AllowlistError::Shape {
            path: display_path(path),
            message,
        })
    }

    /// Build from an already parsed payload. Unknown schema identifiers and
    /// non-object entries are rejected.
    pub fn from_value(payload: &Value) -> Result<Self, String> {
        let root = payload
            .as_object()
            .ok_or_else(|| "top level must be a JSON object".to_string())?;
        let mut fields = BTreeMap::new();
        for (raw_id, entry) in root {
            let id = raw_id.parse::<SchemaId>().map_err(|err| err.to_string())?;
            let entry: &Map<String, Value> = entry
                .as_object()
                .ok_or_else(|| format!("entry for {id} must be a JSON object of field names"))?;
            fields.insert(id, entry.keys().cloned().collect::<BTreeSet<_>>());
        }
        Ok(Self { fields })
    }

    pub fn insert(&mut self, id: SchemaId, field: impl Into<String>) {
        self.fields.entry(id).or_default().insert(field.into());
    }

    /// Field names exempted under `id`, if it has an entry.
    pub fn fields_for(&self, id: SchemaId) -> Option<&BTreeSet<String>> {
        self.fields.get(&id)
    }

    pub fn is_exempt(&self, id: SchemaId, field: &str) -> bool {
        self.fields_for(id).is_some_and(|fields| fields.contains(field))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(BTreeSet::is_empty)
    }
}
