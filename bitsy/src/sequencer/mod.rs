//! Startup sequencing.
//!
//! ## Architecture
//!
//! Startup is a linear pipeline of stages:
//!
//! ```text
//! 1. Settle ──→ 2. Readiness ──→ 3. Permissions ──→ 4. Launch
//!
//! Settle:      fixed sleep, no polling
//! Readiness:   ordered checks, first required failure is terminal
//! Permissions: rw on the I2C and audio nodes, failures only warn
//! Launch:      detached child + PID file
//! ```
//!
//! No stage runs again and nothing is undone. Restarting after a crash is
//! left to systemd.

mod stages;

use crate::check::{self, CheckReport, EvaluationMode, ReadinessCheck};
use crate::launcher::{DetachedLauncher, Launcher};
use crate::options::SequencerOptions;
use crate::startup_log::{FileLog, StartupLog};
use bitsy_shared::errors::BitsyResult;
use bitsy_shared::layout::StartupLayout;
use std::path::PathBuf;
use std::sync::Arc;

/// Outcome of a successful startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchReport {
    /// PID of the spawned application (also written to `pid_file`)
    pub pid: u32,
    /// Interpreter the application was started with
    pub interpreter: PathBuf,
    pub pid_file: PathBuf,
    /// Whether the virtual environment interpreter was used
    pub used_venv: bool,
}

/// Gates the voice application behind readiness checks, then launches it.
///
/// # Example
///
/// ```no_run
/// use bitsy::{SequencerOptions, StartupSequencer};
///
/// # async fn start() -> bitsy::BitsyResult<()> {
/// let sequencer = StartupSequencer::new(SequencerOptions::default())?;
/// let report = sequencer.run().await?;
/// println!("started with PID {}", report.pid);
/// # Ok(())
/// # }
/// ```
pub struct StartupSequencer {
    options: SequencerOptions,
    layout: StartupLayout,
    log: Arc<dyn StartupLog>,
    launcher: Arc<dyn Launcher>,
}

impl StartupSequencer {
    /// Create a sequencer writing to the log file named in `options` and
    /// launching with [`DetachedLauncher`].
    pub fn new(options: SequencerOptions) -> BitsyResult<Self> {
        let layout = options.layout()?;
        let log = Arc::new(FileLog::new(layout.log_file()));

        Ok(Self {
            options,
            layout,
            log,
            launcher: Arc::new(DetachedLauncher),
        })
    }

    /// Replace the startup log sink.
    pub fn with_log(mut self, log: Arc<dyn StartupLog>) -> Self {
        self.log = log;
        self
    }

    /// Replace the launcher.
    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn options(&self) -> &SequencerOptions {
        &self.options
    }

    pub fn layout(&self) -> &StartupLayout {
        &self.layout
    }

    /// The ordered readiness checks for this host.
    pub fn checks(&self) -> Vec<ReadinessCheck> {
        check::startup_checks(&self.options, &self.layout)
    }

    /// Evaluate the readiness checks without logging or side effects.
    pub fn evaluate(&self, mode: EvaluationMode) -> CheckReport {
        check::evaluate(&self.checks(), mode)
    }

    /// Run only the permissions stage, without checks or launch.
    ///
    /// Used by the unit's privileged `ExecStartPre=+` step. Returns the
    /// number of device nodes granted; failures are logged as warnings.
    pub fn grant_devices(&self) -> usize {
        stages::permissions::run(&self.options.device_nodes(), self.log.as_ref())
    }

    /// Run the full startup sequence.
    ///
    /// # Errors
    ///
    /// - `BitsyError::Precondition` if a required check fails; nothing was
    ///   changed on the host
    /// - `BitsyError::Launch` if the application could not be spawned
    /// - `BitsyError::Storage` if the PID file could not be written; the
    ///   application is already running in that case
    pub async fn run(&self) -> BitsyResult<LaunchReport> {
        let log = self.log.as_ref();
        log.info("Starting Bitsy...");

        stages::settle::run(self.options.settle_delay()).await;

        let readiness = stages::readiness::run(&self.checks(), log)?;

        stages::permissions::run(&self.options.device_nodes(), log);

        let spec = stages::launch::prepare(&self.options, &self.layout, readiness.venv_ready);
        stages::launch::run(
            spec,
            self.launcher.as_ref(),
            &self.layout.pid_file(),
            readiness.venv_ready,
            log,
        )
    }
}
