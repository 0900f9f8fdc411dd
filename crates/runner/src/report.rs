//! Per-section test results

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::error::{RunnerError, RunnerResult};
use crate::executor::Outcome;

/// Name of the single test reported when a suite cannot start
pub const INITIALIZATION_TEST: &str = "initialization";

/// Why a reported test failed
#[derive(Debug, Clone)]
pub enum FailureCause {
    /// Expected condition did not hold: a layout rule or a configuration problem
    Mismatch { message: String },
    /// Unexpected fault, carried as raised
    Fault(Arc<RunnerError>),
}

impl FailureCause {
    pub fn message(&self) -> String {
        match self {
            FailureCause::Mismatch { message } => message.clone(),
            FailureCause::Fault(e) => e.to_string(),
        }
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self, FailureCause::Mismatch { .. })
    }

    /// The original error, for faults
    pub fn fault(&self) -> Option<&RunnerError> {
        match self {
            FailureCause::Fault(e) => Some(e.as_ref()),
            FailureCause::Mismatch { .. } => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            FailureCause::Mismatch { .. } => "assertion",
            FailureCause::Fault(_) => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub enum TestStatus {
    Passed,
    Failed(FailureCause),
}

/// One reported test: a section, or the initialization failure
#[derive(Debug, Clone)]
pub struct TestReport {
    pub name: String,
    pub duration_ms: u64,
    pub status: TestStatus,
}

impl TestReport {
    pub fn passed(&self) -> bool {
        matches!(self.status, TestStatus::Passed)
    }

    pub fn failure(&self) -> Option<&FailureCause> {
        match &self.status {
            TestStatus::Failed(cause) => Some(cause),
            TestStatus::Passed => None,
        }
    }
}

/// Results of one suite run
#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub suite: String,
    pub duration_ms: u64,
    pub tests: Vec<TestReport>,
}

impl SuiteReport {
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            duration_ms: 0,
            tests: Vec::new(),
        }
    }

    /// A suite that never started: one failing test carrying `message`
    pub fn configuration_failure(suite: impl Into<String>, message: impl Into<String>) -> Self {
        let mut report = Self::new(suite);
        report.record(TestReport {
            name: INITIALIZATION_TEST.to_string(),
            duration_ms: 0,
            status: TestStatus::Failed(FailureCause::Mismatch {
                message: message.into(),
            }),
        });
        report
    }

    /// Record the outcome of one section
    pub fn push(&mut self, section: impl Into<String>, outcome: Outcome, elapsed: Duration) {
        let status = match outcome {
            Outcome::Passed => TestStatus::Passed,
            Outcome::Failed(message) => TestStatus::Failed(FailureCause::Mismatch { message }),
            Outcome::Errored(e) => TestStatus::Failed(FailureCause::Fault(e)),
        };
        self.record(TestReport {
            name: section.into(),
            duration_ms: elapsed.as_millis() as u64,
            status,
        });
    }

    fn record(&mut self, test: TestReport) {
        match &test.status {
            TestStatus::Passed => info!("✓ {} ({} ms)", test.name, test.duration_ms),
            TestStatus::Failed(cause) => error!("✗ {} - {}", test.name, cause.message()),
        }
        self.tests.push(test);
    }

    pub fn run_count(&self) -> usize {
        self.tests.len()
    }

    pub fn passed(&self) -> usize {
        self.tests.iter().filter(|t| t.passed()).count()
    }

    pub fn failures(&self) -> Vec<&TestReport> {
        self.tests.iter().filter(|t| !t.passed()).collect()
    }

    pub fn was_successful(&self) -> bool {
        self.tests.iter().all(TestReport::passed)
    }

    pub fn log_summary(&self) {
        info!(
            "{}: {} passed, {} failed ({} ms)",
            self.suite,
            self.passed(),
            self.run_count() - self.passed(),
            self.duration_ms
        );
    }

    /// Panic with one line per failed test
    pub fn assert_passed(&self) {
        let failures = self.failures();
        if failures.is_empty() {
            return;
        }
        let lines: Vec<String> = failures
            .iter()
            .map(|t| {
                let message = t.failure().map(|c| c.message()).unwrap_or_default();
                format!("  {}: {}", t.name, message)
            })
            .collect();
        panic!(
            "suite '{}' had {} failing test(s):\n{}",
            self.suite,
            failures.len(),
            lines.join("\n")
        );
    }

    pub fn to_record(&self) -> SuiteRecord {
        SuiteRecord {
            suite: self.suite.clone(),
            total: self.run_count(),
            passed: self.passed(),
            failed: self.run_count() - self.passed(),
            duration_ms: self.duration_ms,
            tests: self
                .tests
                .iter()
                .map(|t| TestRecord {
                    name: t.name.clone(),
                    duration_ms: t.duration_ms,
                    passed: t.passed(),
                    kind: t.failure().map(FailureCause::kind),
                    message: t.failure().map(FailureCause::message),
                })
                .collect(),
        }
    }

    /// Write the report as `<suite>.json` into `dir`
    pub fn write_json(&self, dir: &Path) -> RunnerResult<PathBuf> {
        self.write_json_as(dir, &file_stem(&self.suite))
    }

    fn write_json_as(&self, dir: &Path, stem: &str) -> RunnerResult<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let path = dir.join(format!("{}.json", stem));
        let json = serde_json::to_string_pretty(&self.to_record())?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// Write every report into `dir`, one file each.
///
/// Suites sharing a name get `-2`, `-3`, ... suffixes in run order, so no
/// report overwrites another.
pub fn write_reports(reports: &[SuiteReport], dir: &Path) -> RunnerResult<Vec<PathBuf>> {
    let mut used = HashSet::new();
    let mut paths = Vec::with_capacity(reports.len());
    for report in reports {
        let base = file_stem(&report.suite);
        let mut stem = base.clone();
        let mut n = 1;
        while !used.insert(stem.clone()) {
            n += 1;
            stem = format!("{}-{}", base, n);
        }
        paths.push(report.write_json_as(dir, &stem)?);
    }
    Ok(paths)
}

fn file_stem(suite: &str) -> String {
    suite
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}

/// Serializable view of a [`SuiteReport`]
#[derive(Debug, Clone, Serialize)]
pub struct SuiteRecord {
    pub suite: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub tests: Vec<TestRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestRecord {
    pub name: String,
    pub duration_ms: u64,
    pub passed: bool,
    /// `assertion` or `error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
