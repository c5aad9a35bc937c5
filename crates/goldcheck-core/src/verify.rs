//! Run orchestration: one pass over the contracts tree.

use crate::allowlist::Allowlist;
use crate::canonical::{CanonicalCheck, check_canonical};
use crate::discovery::{GoldenPath, discover_goldens};
use crate::error::{ContractsError, display_path};
use crate::report::{FixtureReport, RunReport};
use crate::scanner::scan_document;
use crate::schema::{SchemaId, SchemaRegistry};
use crate::violation::{Violation, ViolationKind};
use std::fs;
use std::path::{Path, PathBuf};

pub const GOLDENS_DIR: &str = "goldens";
pub const SCHEMAS_DIR: &str = "schemas";
pub const ALLOWLIST_REL_PATH: &str = "compat/field_allowlist.json";
pub const PROTOCOL_VERSION_REL_PATH: &str = "compat/protocol_version.json";

/// Where the pieces of a contracts tree live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractsLayout {
    pub root: PathBuf,
}

impl ContractsLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn goldens_dir(&self) -> PathBuf {
        self.root.join(GOLDENS_DIR)
    }

    pub fn schemas_dir(&self) -> PathBuf {
        self.root.join(SCHEMAS_DIR)
    }

    pub fn allowlist_path(&self) -> PathBuf {
        self.root.join(ALLOWLIST_REL_PATH)
    }

    pub fn protocol_version_path(&self) -> PathBuf {
        self.root.join(PROTOCOL_VERSION_REL_PATH)
    }

    /// Locate a contracts tree when none is given.
    ///
    /// Searches upward from `exe_dir`, then from `start`, for a directory
    /// that is itself a contracts tree (`schemas/` and `goldens/`), or that
    /// holds one at `contracts/` or `third_party/contracts/`. The tool's own
    /// location wins over the working directory. Falls back to
    /// `<start>/contracts`.
    pub fn detect(start: &Path, exe_dir: Option<&Path>) -> Self {
        for origin in exe_dir.into_iter().chain(std::iter::once(start)) {
            for dir in origin.ancestors() {
                if dir.join(SCHEMAS_DIR).is_dir() && dir.join(GOLDENS_DIR).is_dir() {
                    return Self::new(dir);
                }
                for candidate in [dir.join("contracts"), dir.join("third_party/contracts")] {
                    if candidate.join(SCHEMAS_DIR).is_dir() {
                        return Self::new(candidate);
                    }
                }
            }
        }
        Self::new(start.join("contracts"))
    }
}

/// Run every check over the contracts tree at `layout`.
///
/// Returns `Err` only when the tree itself is unusable; every finding about
/// individual fixtures is in the returned report.
pub fn verify_contracts(layout: &ContractsLayout) -> Result<RunReport, ContractsError> {
    if !layout.root.is_dir() {
        return Err(ContractsError::RootNotDirectory {
            path: display_path(&layout.root),
        });
    }

    let allowlist = Allowlist::load(&layout.allowlist_path())?;
    let missing = (!layout.protocol_version_path().exists())
        .then(|| Violation::missing(PROTOCOL_VERSION_REL_PATH));
    if missing.is_some() {
        tracing::warn!(path = PROTOCOL_VERSION_REL_PATH, "protocol version marker missing");
    }

    let goldens = discover_goldens(&layout.goldens_dir(), &layout.root)?;
    let registry = SchemaRegistry::load(&layout.schemas_dir());

    let mut fixtures = Vec::with_capacity(goldens.len());
    for golden in &goldens {
        let fixture = check_golden(golden, &registry, &allowlist);
        tracing::debug!(
            path = %fixture.rel_path,
            violations = fixture.violations.len(),
            "checked golden"
        );
        fixtures.push(fixture);
    }

    let report = RunReport { missing, fixtures };
    tracing::info!(
        goldens = report.golden_count(),
        failed = report.failed_count(),
        violations = report.violation_count(),
        "contracts verified"
    );
    Ok(report)
}

/// Read one discovered fixture and check it. An unreadable fixture is a
/// NOT_CANONICAL record for that fixture alone.
pub fn check_golden(
    golden: &GoldenPath,
    registry: &SchemaRegistry,
    allowlist: &Allowlist,
) -> FixtureReport {
    match fs::read(&golden.abs_path) {
        Ok(raw) => check_fixture(&golden.rel_path, &raw, registry, allowlist),
        Err(err) => {
            tracing::warn!(path = %golden.rel_path, error = %err, "golden unreadable");
            FixtureReport {
                rel_path: golden.rel_path.clone(),
                violations: vec![Violation::new(
                    ViolationKind::NotCanonical,
                    format!("failed to read {}: {err}", golden.rel_path),
                )],
            }
        }
    }
}

/// All checks for one fixture's bytes. Canonical form first; schema and
/// determinism only when the bytes parse.
pub fn check_fixture(
    rel_path: &str,
    raw: &[u8],
    registry: &SchemaRegistry,
    allowlist: &Allowlist,
) -> FixtureReport {
    let path = Path::new(rel_path);
    let (document, mut violations) = match check_canonical(raw, rel_path) {
        CanonicalCheck::Unparseable(violation) => {
            return FixtureReport {
                rel_path: rel_path.to_string(),
                violations: vec![violation],
            };
        }
        CanonicalCheck::Parsed {
            document,
            violation,
        } => (document, violation.into_iter().collect::<Vec<_>>()),
    };

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| rel_path.to_string());
    violations.extend(registry.check_fixture(path, &document));
    violations.extend(scan_document(
        &document,
        SchemaId::for_path(path),
        allowlist,
        &file_name,
    ));

    FixtureReport {
        rel_path: rel_path.to_string(),
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "goldcheck-verify-{prefix}-{}-{unique}",
            std::process::id()
        ))
    }

    #[test]
    fn unreadable_golden_is_a_fixture_record_not_an_abort() {
        let base = temp_path("unreadable");
        let golden = GoldenPath {
            rel_path: "goldens/Script.json".to_string(),
            abs_path: base.join("goldens/Script.json"),
        };
        let registry = SchemaRegistry::load(&base.join(SCHEMAS_DIR));
        let report = check_golden(&golden, &registry, &Allowlist::empty());
        assert_eq!(report.rel_path, "goldens/Script.json");
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].kind, ViolationKind::NotCanonical);
        assert!(
            report.violations[0]
                .message()
                .starts_with("NOT_CANONICAL: failed to read goldens/Script.json: "),
            "{}",
            report.violations[0].message()
        );
    }

    #[test]
    fn detect_prefers_executable_location_over_working_directory() {
        let base = temp_path("detect-order");
        let tool_tree = base.join("tool/contracts");
        let cwd_tree = base.join("checkout/contracts");
        for tree in [&tool_tree, &cwd_tree] {
            fs::create_dir_all(tree.join(SCHEMAS_DIR)).expect("mkdir schemas");
        }
        let exe_dir = base.join("tool/bin");
        fs::create_dir_all(&exe_dir).expect("mkdir bin");
        let start = base.join("checkout/src");
        fs::create_dir_all(&start).expect("mkdir src");

        let layout = ContractsLayout::detect(&start, Some(&exe_dir));
        assert_eq!(layout.root, tool_tree);
        let layout = ContractsLayout::detect(&start, None);
        assert_eq!(layout.root, cwd_tree);
        let _ = fs::remove_dir_all(&base);
    }
}
