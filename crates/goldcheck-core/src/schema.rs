//! Filename-stem → schema selection and draft-7 validation.

use crate::error::display_path;
use crate::violation::{Violation, ViolationKind};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Validator messages kept per failing fixture; the rest are dropped.
pub const MAX_SCHEMA_MESSAGES: usize = 3;

/// The contract schemas a golden can be held to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaId {
    Script,
    ShotList,
    AssetManifest,
    RenderPlan,
    RenderOutput,
    RenderPackage,
    EpisodeBundle,
}

impl SchemaId {
    pub const ALL: [SchemaId; 7] = [
        SchemaId::Script,
        SchemaId::ShotList,
        SchemaId::AssetManifest,
        SchemaId::RenderPlan,
        SchemaId::RenderOutput,
        SchemaId::RenderPackage,
        SchemaId::EpisodeBundle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Script => "Script",
            Self::ShotList => "ShotList",
            Self::AssetManifest => "AssetManifest",
            Self::RenderPlan => "RenderPlan",
            Self::RenderOutput => "RenderOutput",
            Self::RenderPackage => "RenderPackage",
            Self::EpisodeBundle => "EpisodeBundle",
        }
    }

    /// Schema document name under `schemas/`.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Script => "Script.v1.json",
            Self::ShotList => "ShotList.v1.json",
            Self::AssetManifest => "AssetManifest.v1.json",
            Self::RenderPlan => "RenderPlan.v1.json",
            Self::RenderOutput => "RenderOutput.v1.json",
            Self::RenderPackage => "RenderPackage.v1.json",
            Self::EpisodeBundle => "EpisodeBundle.v1.json",
        }
    }

    /// Goldens are named after the schema they exemplify (`Script.json`).
    /// Stems outside the table are intentionally unmapped.
    pub fn from_stem(stem: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == stem)
    }

    /// Schema selected by a fixture path's file stem.
    pub fn for_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(Self::from_stem)
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown schema identifier: {0}")]
pub struct UnknownSchemaId(pub String);

impl FromStr for SchemaId {
    type Err = UnknownSchemaId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::from_stem(raw).ok_or_else(|| UnknownSchemaId(raw.to_string()))
    }
}

enum SchemaSlot {
    Ready(jsonschema::Validator),
    Absent(PathBuf),
    Unusable(String),
}

/// Every mapped schema, loaded and compiled once per run.
///
/// Loading never fails as a whole: an absent or broken schema file is
/// remembered and surfaces as a violation on each fixture that needs it.
pub struct SchemaRegistry {
    slots: BTreeMap<SchemaId, SchemaSlot>,
}

impl SchemaRegistry {
    pub fn load(schemas_dir: &Path) -> Self {
        let slots = SchemaId::ALL
            .into_iter()
            .map(|id| (id, load_slot(schemas_dir, id)))
            .collect();
        Self { slots }
    }

    /// Validate `document` against the schema `id`, naming `file_name` in
    /// any resulting record.
    pub fn check(&self, id: SchemaId, document: &Value, file_name: &str) -> Vec<Violation> {
        let invalid = |detail: String| {
            vec![Violation::new(
                ViolationKind::SchemaInvalid,
                format!("{file_name}: {detail}"),
            )]
        };
        match self.slots.get(&id) {
            Some(SchemaSlot::Ready(validator)) => {
                let messages: Vec<String> = validator
                    .iter_errors(document)
                    .take(MAX_SCHEMA_MESSAGES)
                    .map(|err| err.to_string())
                    .collect();
                if messages.is_empty() {
                    Vec::new()
                } else {
                    invalid(messages.join("; "))
                }
            }
            Some(SchemaSlot::Absent(path)) => {
                invalid(format!("schema file not found: {}", display_path(path)))
            }
            Some(SchemaSlot::Unusable(reason)) => invalid(reason.clone()),
            None => invalid(format!("schema {id} was not loaded")),
        }
    }

    /// Schema check for a fixture path: unmapped stems produce nothing.
    pub fn check_fixture(&self, path: &Path, document: &Value) -> Vec<Violation> {
        let Some(id) = SchemaId::for_path(path) else {
            tracing::debug!(path = %display_path(path), "no schema mapped; skipping schema check");
            return Vec::new();
        };
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.check(id, document, &file_name)
    }
}

fn load_slot(schemas_dir: &Path, id: SchemaId) -> SchemaSlot {
    let path = schemas_dir.join(id.file_name());
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(schema = %id, path = %display_path(&path), "schema file absent");
            return SchemaSlot::Absent(path);
        }
        Err(err) => {
            return unusable(id, format!("failed to read {}: {err}", display_path(&path)));
        }
    };
    let schema: Value = match serde_json::from_slice(&bytes) {
        Ok(schema) => schema,
        Err(err) => return unusable(id, format!("invalid json at {}: {err}", display_path(&path))),
    };
    match jsonschema::draft7::new(&schema) {
        Ok(validator) => {
            tracing::debug!(schema = %id, path = %display_path(&path), "compiled schema");
            SchemaSlot::Ready(validator)
        }
        Err(err) => unusable(id, format!("invalid schema {}: {err}", display_path(&path))),
    }
}

fn unusable(id: SchemaId, reason: String) -> SchemaSlot {
    tracing::warn!(schema = %id, %reason, "schema unusable");
    SchemaSlot::Unusable(reason)
}
