//! Readiness checks gating application launch.
//!
//! A check is a filesystem predicate tagged [`Requirement::Required`] or
//! [`Requirement::Optional`]. [`evaluate`] runs an ordered list of checks
//! with one rule for both kinds: a failed required check halts evaluation
//! and a failed optional check is recorded and skipped over.
//!
//! The predicates only look at the filesystem. They never open device
//! nodes, so evaluating is free of side effects.

mod host;

pub use host::startup_checks;

use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of a startup check, used to look up outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckId {
    Gpio,
    I2c,
    EntryPoint,
    VirtualEnv,
    Credentials,
}

impl CheckId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckId::Gpio => "gpio",
            CheckId::I2c => "i2c",
            CheckId::EntryPoint => "entry-point",
            CheckId::VirtualEnv => "venv",
            CheckId::Credentials => "credentials",
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a failing check stops the sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// Failure is terminal for the invocation.
    Required,
    /// Failure is logged as a warning and the sequence continues degraded.
    Optional,
}

/// Filesystem predicate backing a check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Probe {
    /// Path exists and is a directory.
    DirExists(PathBuf),
    /// Path exists and is a regular file.
    FileExists(PathBuf),
    /// Path exists with any file type (device nodes included).
    PathExists(PathBuf),
}

impl Probe {
    pub fn path(&self) -> &Path {
        match self {
            Probe::DirExists(p) | Probe::FileExists(p) | Probe::PathExists(p) => p,
        }
    }

    /// Evaluate the predicate. Symlinks are followed.
    pub fn holds(&self) -> bool {
        match self {
            Probe::DirExists(p) => p.is_dir(),
            Probe::FileExists(p) => p.is_file(),
            Probe::PathExists(p) => p.exists(),
        }
    }
}

/// One entry of the ordered readiness list.
#[derive(Clone, Debug)]
pub struct ReadinessCheck {
    pub id: CheckId,
    /// Human-readable name (e.g. "GPIO interface")
    pub name: String,
    pub probe: Probe,
    pub requirement: Requirement,
    /// Logged when the probe fails
    pub failure_message: String,
    /// Suggested fix, shown by `bitsy check`
    pub hint: Option<String>,
}

impl ReadinessCheck {
    pub fn required(
        id: CheckId,
        name: impl Into<String>,
        probe: Probe,
        failure_message: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            probe,
            requirement: Requirement::Required,
            failure_message: failure_message.into(),
            hint: None,
        }
    }

    pub fn optional(
        id: CheckId,
        name: impl Into<String>,
        probe: Probe,
        failure_message: impl Into<String>,
    ) -> Self {
        Self {
            requirement: Requirement::Optional,
            ..Self::required(id, name, probe, failure_message)
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckStatus {
    Passed,
    Failed,
}

/// Result of evaluating a single check.
#[derive(Clone, Debug)]
pub struct CheckOutcome {
    pub check: ReadinessCheck,
    pub status: CheckStatus,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }

    /// Failed and required: this outcome halts the sequence.
    pub fn is_fatal(&self) -> bool {
        self.status == CheckStatus::Failed && self.check.requirement == Requirement::Required
    }
}

/// How far to evaluate after a required check fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    /// Stop at the first failing required check (startup behaviour).
    #[default]
    StopAtFirstFailure,
    /// Evaluate every check (diagnostics).
    Exhaustive,
}

/// Outcomes of an evaluation, in check order.
#[derive(Clone, Debug, Default)]
pub struct CheckReport {
    pub outcomes: Vec<CheckOutcome>,
    /// First required check that failed, if any
    pub halted_by: Option<CheckId>,
}

impl CheckReport {
    /// No required check failed.
    pub fn is_ready(&self) -> bool {
        self.halted_by.is_none()
    }

    pub fn outcome(&self, id: CheckId) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.check.id == id)
    }

    /// Whether the check was evaluated and passed.
    pub fn passed(&self, id: CheckId) -> bool {
        self.outcome(id).is_some_and(CheckOutcome::passed)
    }

    /// The outcome that halted evaluation.
    pub fn fatal(&self) -> Option<&CheckOutcome> {
        self.halted_by.and_then(|id| self.outcome(id))
    }

    /// Optional checks that failed.
    pub fn warnings(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !o.passed() && o.check.requirement == Requirement::Optional)
    }
}

/// Evaluate `checks` in order.
pub fn evaluate(checks: &[ReadinessCheck], mode: EvaluationMode) -> CheckReport {
    let mut report = CheckReport::default();

    for check in checks {
        let status = if check.probe.holds() {
            CheckStatus::Passed
        } else {
            CheckStatus::Failed
        };

        tracing::debug!(
            check = %check.id,
            path = %check.probe.path().display(),
            passed = status == CheckStatus::Passed,
            "Evaluated readiness check"
        );

        let outcome = CheckOutcome {
            check: check.clone(),
            status,
        };
        let fatal = outcome.is_fatal();
        report.outcomes.push(outcome);

        if fatal {
            if report.halted_by.is_none() {
                report.halted_by = Some(check.id);
            }
            if mode == EvaluationMode::StopAtFirstFailure {
                break;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dir_check(id: CheckId, path: PathBuf, requirement: Requirement) -> ReadinessCheck {
        let check = ReadinessCheck::required(id, id.as_str(), Probe::DirExists(path), "missing");
        ReadinessCheck {
            requirement,
            ..check
        }
    }

    #[test]
    fn test_probes() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, "x").unwrap();

        assert!(Probe::DirExists(dir.path().to_path_buf()).holds());
        assert!(!Probe::DirExists(file.clone()).holds());
        assert!(Probe::FileExists(file.clone()).holds());
        assert!(!Probe::FileExists(dir.path().to_path_buf()).holds());
        assert!(Probe::PathExists(file).holds());
        assert!(!Probe::PathExists(dir.path().join("missing")).holds());
    }

    #[test]
    fn test_all_pass() {
        let dir = TempDir::new().unwrap();
        let checks = vec![
            dir_check(CheckId::Gpio, dir.path().into(), Requirement::Required),
            dir_check(CheckId::VirtualEnv, dir.path().into(), Requirement::Optional),
        ];

        let report = evaluate(&checks, EvaluationMode::StopAtFirstFailure);
        assert!(report.is_ready());
        assert_eq!(report.outcomes.len(), 2);
        assert!(report.passed(CheckId::Gpio));
        assert!(report.passed(CheckId::VirtualEnv));
    }

    #[test]
    fn test_required_failure_halts() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let checks = vec![
            dir_check(CheckId::Gpio, missing, Requirement::Required),
            dir_check(CheckId::I2c, dir.path().into(), Requirement::Required),
        ];

        let report = evaluate(&checks, EvaluationMode::StopAtFirstFailure);
        assert!(!report.is_ready());
        assert_eq!(report.halted_by, Some(CheckId::Gpio));
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.outcome(CheckId::I2c).is_none());
        assert_eq!(report.fatal().map(|o| o.check.id), Some(CheckId::Gpio));
    }

    #[test]
    fn test_optional_failure_continues() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("venv");
        let checks = vec![
            dir_check(CheckId::VirtualEnv, missing, Requirement::Optional),
            dir_check(CheckId::Credentials, dir.path().into(), Requirement::Required),
        ];

        let report = evaluate(&checks, EvaluationMode::StopAtFirstFailure);
        assert!(report.is_ready());
        assert!(!report.passed(CheckId::VirtualEnv));
        assert!(report.passed(CheckId::Credentials));
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_exhaustive_keeps_first_halt() {
        let dir = TempDir::new().unwrap();
        let checks = vec![
            dir_check(CheckId::Gpio, dir.path().join("a"), Requirement::Required),
            dir_check(CheckId::I2c, dir.path().join("b"), Requirement::Required),
            dir_check(CheckId::Credentials, dir.path().into(), Requirement::Required),
        ];

        let report = evaluate(&checks, EvaluationMode::Exhaustive);
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.halted_by, Some(CheckId::Gpio));
        assert!(report.passed(CheckId::Credentials));
    }
}
