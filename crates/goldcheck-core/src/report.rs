//! Run results and their stable line-oriented rendering.

use crate::violation::{Violation, ViolationKind};
use serde_json::{Value, json};

const CHECK_KIND: &str = "contracts.verify.v1";
const STATUS_WIDTH: usize = 7;

/// Every record produced for one fixture, in check order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureReport {
    pub rel_path: String,
    pub violations: Vec<Violation>,
}

impl FixtureReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Outcome of a whole run. Fixture order is discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Global record for the absent protocol-version marker.
    pub missing: Option<Violation>,
    pub fixtures: Vec<FixtureReport>,
}

impl RunReport {
    pub fn golden_count(&self) -> usize {
        self.fixtures.len()
    }

    pub fn passed_count(&self) -> usize {
        self.fixtures.iter().filter(|f| f.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.golden_count() - self.passed_count()
    }

    /// All records, the global ones included.
    pub fn violation_count(&self) -> usize {
        usize::from(self.missing.is_some())
            + self
                .fixtures
                .iter()
                .map(|f| f.violations.len())
                .sum::<usize>()
    }

    pub fn accepted(&self) -> bool {
        self.violation_count() == 0
    }

    /// 0 when nothing was found, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.accepted() { 0 } else { 1 }
    }

    pub fn violations_of(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.missing
            .iter()
            .chain(self.fixtures.iter().flat_map(|f| f.violations.iter()))
            .filter(move |v| v.kind == kind)
    }

    /// The report as stdout lines.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(violation) = &self.missing {
            lines.push(status_line("FAIL", &violation.message()));
        }
        lines.push(format!("Contracts verified: {} goldens", self.golden_count()));
        for fixture in &self.fixtures {
            if fixture.passed() {
                lines.push(status_line("PASS", &fixture.rel_path));
                continue;
            }
            for violation in &fixture.violations {
                lines.push(status_line(
                    "FAIL",
                    &format!("{}: {}", fixture.rel_path, violation.message()),
                ));
            }
        }
        lines.push(format!(
            "Summary: {} passed, {} failed",
            self.passed_count(),
            self.failed_count()
        ));
        lines.push(self.result_line());
        lines
    }

    pub fn render(&self) -> String {
        let mut text = self.render_lines().join("\n");
        text.push('\n');
        text
    }

    pub fn result_line(&self) -> String {
        let total = self.golden_count();
        if self.accepted() {
            format!("RESULT: PASS ({total}/{total})")
        } else {
            format!("RESULT: FAIL ({}/{total} failed)", self.violation_count())
        }
    }

    /// Machine-readable payload for `--json`.
    pub fn to_json(&self, contracts_dir: &str) -> Value {
        let goldens: Vec<Value> = self
            .fixtures
            .iter()
            .map(|fixture| {
                json!({
                    "path": fixture.rel_path,
                    "result": if fixture.passed() { "pass" } else { "fail" },
                    "violations": fixture
                        .violations
                        .iter()
                        .map(violation_json)
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        json!({
            "schema": 1,
            "checkKind": CHECK_KIND,
            "result": if self.accepted() { "accepted" } else { "rejected" },
            "contractsDir": contracts_dir,
            "goldenCount": self.golden_count(),
            "passedCount": self.passed_count(),
            "failedCount": self.failed_count(),
            "violationCount": self.violation_count(),
            "missing": self.missing.as_ref().map(Violation::message),
            "goldens": goldens,
        })
    }
}

fn violation_json(violation: &Violation) -> Value {
    json!({
        "kind": violation.kind,
        "message": violation.message(),
    })
}

fn status_line(status: &str, body: &str) -> String {
    format!("{status:<width$}{body}", width = STATUS_WIDTH)
}
