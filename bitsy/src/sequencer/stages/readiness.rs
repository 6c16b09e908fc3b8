//! Stage 2: readiness.
//!
//! Runs the ordered checks, logs every failure and stops at the first
//! failing required check.

use crate::check::{self, CheckId, CheckReport, EvaluationMode, ReadinessCheck, Requirement};
use crate::startup_log::StartupLog;
use bitsy_shared::errors::{BitsyError, BitsyResult};

/// Result of a passed readiness stage.
#[derive(Debug)]
pub struct ReadinessOutput {
    pub report: CheckReport,
    /// The virtual environment exists; use its interpreter
    pub venv_ready: bool,
}

pub fn run(checks: &[ReadinessCheck], log: &dyn StartupLog) -> BitsyResult<ReadinessOutput> {
    let report = check::evaluate(checks, EvaluationMode::StopAtFirstFailure);

    for outcome in report.outcomes.iter().filter(|o| !o.passed()) {
        match outcome.check.requirement {
            Requirement::Required => log.error(&outcome.check.failure_message),
            Requirement::Optional => log.warn(&outcome.check.failure_message),
        }
    }

    if let Some(fatal) = report.fatal() {
        return Err(BitsyError::precondition(
            fatal.check.id.as_str(),
            fatal.check.failure_message.clone(),
        ));
    }

    let venv_ready = report.passed(CheckId::VirtualEnv);
    Ok(ReadinessOutput { report, venv_ready })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Probe;
    use crate::startup_log::MemoryLog;
    use tempfile::TempDir;

    #[test]
    fn test_required_failure_logs_error() {
        let dir = TempDir::new().unwrap();
        let checks = vec![ReadinessCheck::required(
            CheckId::Gpio,
            "GPIO interface",
            Probe::DirExists(dir.path().join("gpio")),
            "GPIO not available",
        )];
        let log = MemoryLog::new();

        let err = run(&checks, &log).unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(log.messages(), vec!["ERROR: GPIO not available"]);
    }

    #[test]
    fn test_optional_failure_logs_warning() {
        let dir = TempDir::new().unwrap();
        let checks = vec![ReadinessCheck::optional(
            CheckId::VirtualEnv,
            "Virtual environment",
            Probe::DirExists(dir.path().join("venv")),
            "Virtual environment not found",
        )];
        let log = MemoryLog::new();

        let output = run(&checks, &log).unwrap();
        assert!(!output.venv_ready);
        assert_eq!(log.messages(), vec!["WARNING: Virtual environment not found"]);
    }

    #[test]
    fn test_passing_checks_are_quiet() {
        let dir = TempDir::new().unwrap();
        let checks = vec![ReadinessCheck::optional(
            CheckId::VirtualEnv,
            "Virtual environment",
            Probe::DirExists(dir.path().to_path_buf()),
            "Virtual environment not found",
        )];
        let log = MemoryLog::new();

        let output = run(&checks, &log).unwrap();
        assert!(output.venv_ready);
        assert!(log.messages().is_empty());
    }
}
