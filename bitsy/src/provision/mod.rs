//! One-time host provisioning.
//!
//! Prepares everything the startup sequencer consumes:
//!
//! ```text
//! 1. Hardware   ── dtparam=i2c_arm=on, i2c-dev module
//! 2. Groups     ── usermod -aG gpio,i2c,audio <user>
//! 3. Venv       ── python3 -m venv <work_dir>/venv
//! 4. Credentials── verify <work_dir>/.env (never written)
//! 5. Executable ── verify the sequencer binary
//! 6. Unit       ── bitsy.service, daemon-reload, enable
//! ```
//!
//! Options come from the `provision` object of the JSON options file that
//! also holds the sequencer options (see [`ProvisionOptions::load`]).
//!
//! Every step is idempotent: running the provisioner twice changes nothing
//! the second time, apart from re-applying group membership. OS package
//! installation is not handled here.

mod boot_config;
mod runner;
mod unit;

pub use boot_config::{ensure_line, has_line, with_line};
pub use runner::{CommandRunner, SystemRunner};
pub use unit::ServiceUnit;

use crate::options::SequencerOptions;
use bitsy_shared::constants::{boot, interpreter, service};
use bitsy_shared::errors::{BitsyError, BitsyResult};
use bitsy_shared::layout::StartupLayout;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Provisioning configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProvisionOptions {
    /// Service user, added to the hardware groups.
    ///
    /// Default: $SUDO_USER, then $USER, then "pi"
    #[serde(default = "default_user")]
    pub user: String,

    /// Sequencer binary written into `ExecStart`.
    ///
    /// Default: the running executable
    #[serde(default)]
    pub exec: Option<PathBuf>,

    /// Arguments after the binary in `ExecStart`.
    ///
    /// Default: start
    #[serde(default = "default_exec_args")]
    pub exec_args: Vec<String>,

    /// Arguments after the binary in the privileged `ExecStartPre=+` step.
    /// `null` leaves the step out of the unit.
    ///
    /// Default: grant
    #[serde(default = "default_grant_args")]
    pub grant_args: Option<Vec<String>>,

    /// Arguments placed before both `exec_args` and `grant_args`, such as the
    /// `--config` the sequencer must be started with. Set by the caller.
    #[serde(skip)]
    pub global_args: Vec<String>,

    #[serde(default = "default_unit_dir")]
    pub unit_dir: PathBuf,

    #[serde(default = "default_unit_name")]
    pub unit_name: String,

    /// Default: /boot/firmware/config.txt
    #[serde(default = "default_boot_config")]
    pub boot_config: PathBuf,

    /// Default: /etc/modules
    #[serde(default = "default_modules_file")]
    pub modules_file: PathBuf,

    /// Default: gpio, i2c, audio
    #[serde(default = "default_groups")]
    pub groups: Vec<String>,

    /// Interpreter used to create the virtual environment.
    #[serde(default = "default_python")]
    pub python: String,

    /// Report planned actions without changing anything.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_user() -> String {
    std::env::var("SUDO_USER")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_else(|_| "pi".to_string())
}

fn default_exec_args() -> Vec<String> {
    vec!["start".to_string()]
}

fn default_grant_args() -> Option<Vec<String>> {
    Some(vec!["grant".to_string()])
}

fn default_unit_dir() -> PathBuf {
    PathBuf::from(service::UNIT_DIR)
}

fn default_unit_name() -> String {
    service::UNIT_NAME.to_string()
}

fn default_boot_config() -> PathBuf {
    PathBuf::from(boot::CONFIG_TXT)
}

fn default_modules_file() -> PathBuf {
    PathBuf::from(boot::MODULES_FILE)
}

fn default_groups() -> Vec<String> {
    boot::GROUPS.iter().map(|g| g.to_string()).collect()
}

fn default_python() -> String {
    interpreter::SYSTEM.to_string()
}

impl Default for ProvisionOptions {
    fn default() -> Self {
        Self {
            user: default_user(),
            exec: None,
            exec_args: default_exec_args(),
            grant_args: default_grant_args(),
            global_args: Vec::new(),
            unit_dir: default_unit_dir(),
            unit_name: default_unit_name(),
            boot_config: default_boot_config(),
            modules_file: default_modules_file(),
            groups: default_groups(),
            python: default_python(),
            dry_run: false,
        }
    }
}

impl ProvisionOptions {
    /// Load the `provision` object of a JSON options file.
    ///
    /// A file without that object yields the defaults, like an empty object.
    pub fn load(path: &Path) -> BitsyResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BitsyError::Config(format!(
                "Failed to read options file {}: {}",
                path.display(),
                e
            ))
        })?;

        #[derive(Deserialize)]
        struct OptionsFile {
            #[serde(default)]
            provision: Option<ProvisionOptions>,
        }

        let file: OptionsFile = serde_json::from_str(&content).map_err(|e| {
            BitsyError::Config(format!(
                "Invalid options file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(file.provision.unwrap_or_default())
    }

    fn with_global_args(&self, args: &[String]) -> Vec<String> {
        self.global_args.iter().chain(args).cloned().collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProvisionStep {
    Hardware,
    Groups,
    VirtualEnv,
    Credentials,
    Executable,
    Unit,
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProvisionStep::Hardware => "hardware",
            ProvisionStep::Groups => "groups",
            ProvisionStep::VirtualEnv => "venv",
            ProvisionStep::Credentials => "credentials",
            ProvisionStep::Executable => "executable",
            ProvisionStep::Unit => "unit",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    Changed,
    Unchanged,
    /// Dry run: would change
    Planned,
    /// Left for the operator to fix
    Warning,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepStatus::Changed => "changed",
            StepStatus::Unchanged => "unchanged",
            StepStatus::Planned => "planned",
            StepStatus::Warning => "warning",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug)]
pub struct StepReport {
    pub step: ProvisionStep,
    pub status: StepStatus,
    pub detail: String,
}

#[derive(Clone, Debug, Default)]
pub struct ProvisionReport {
    pub steps: Vec<StepReport>,
}

impl ProvisionReport {
    pub fn status(&self, step: ProvisionStep) -> Option<StepStatus> {
        self.steps.iter().find(|s| s.step == step).map(|s| s.status)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.status == StepStatus::Warning)
    }

    fn push(&mut self, step: ProvisionStep, status: StepStatus, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::info!(%step, %status, "{}", detail);
        self.steps.push(StepReport {
            step,
            status,
            detail,
        });
    }
}

/// Applies the provisioning steps.
pub struct Provisioner {
    options: ProvisionOptions,
    layout: StartupLayout,
    runner: Arc<dyn CommandRunner>,
}

impl Provisioner {
    /// Create a provisioner for the host described by `startup`.
    pub fn new(options: ProvisionOptions, startup: &SequencerOptions) -> BitsyResult<Self> {
        Ok(Self {
            options,
            layout: startup.layout()?,
            runner: Arc::new(SystemRunner),
        })
    }

    /// Replace the command runner.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Resolved sequencer binary.
    pub fn exec_path(&self) -> BitsyResult<PathBuf> {
        match &self.options.exec {
            Some(exec) => Ok(exec.clone()),
            None => std::env::current_exe().map_err(|e| {
                BitsyError::Config(format!("Cannot determine sequencer binary: {}", e))
            }),
        }
    }

    /// The unit this provisioner installs.
    pub fn unit(&self) -> BitsyResult<ServiceUnit> {
        Ok(ServiceUnit::new(
            &self.options.user,
            self.layout.root(),
            self.exec_path()?,
            self.layout.pid_file(),
        )
        .with_args(self.options.with_global_args(&self.options.exec_args))
        .with_grant_args(
            self.options
                .grant_args
                .as_deref()
                .map(|args| self.options.with_global_args(args)),
        ))
    }

    pub fn unit_path(&self) -> PathBuf {
        self.options.unit_dir.join(&self.options.unit_name)
    }

    /// Run all steps in order. Stops at the first step that errors.
    pub fn run(&self) -> BitsyResult<ProvisionReport> {
        let mut report = ProvisionReport::default();

        self.hardware(&mut report)?;
        self.groups(&mut report)?;
        self.virtual_env(&mut report)?;
        self.credentials(&mut report);
        self.executable(&mut report)?;
        self.service_unit(&mut report)?;

        Ok(report)
    }

    fn hardware(&self, report: &mut ProvisionReport) -> BitsyResult<()> {
        let edits = [
            (&self.options.boot_config, boot::I2C_DTPARAM),
            (&self.options.modules_file, boot::I2C_MODULE),
        ];

        let mut missing = Vec::new();
        for (path, line) in edits {
            let present = match std::fs::read_to_string(path) {
                Ok(content) => has_line(&content, line),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
                Err(e) => {
                    return Err(BitsyError::Provision(format!(
                        "Failed to read {}: {}",
                        path.display(),
                        e
                    )));
                }
            };
            if !present {
                missing.push((path, line));
            }
        }

        if missing.is_empty() {
            report.push(ProvisionStep::Hardware, StepStatus::Unchanged, "I2C already enabled");
            return Ok(());
        }

        let detail = missing
            .iter()
            .map(|(path, line)| format!("{} in {}", line, path.display()))
            .collect::<Vec<_>>()
            .join(", ");

        if self.options.dry_run {
            report.push(ProvisionStep::Hardware, StepStatus::Planned, format!("add {}", detail));
            return Ok(());
        }

        for (path, line) in missing {
            ensure_line(path, line)?;
        }
        report.push(
            ProvisionStep::Hardware,
            StepStatus::Changed,
            format!("added {} (reboot required)", detail),
        );
        Ok(())
    }

    fn groups(&self, report: &mut ProvisionReport) -> BitsyResult<()> {
        if self.options.groups.is_empty() {
            report.push(ProvisionStep::Groups, StepStatus::Unchanged, "no groups configured");
            return Ok(());
        }

        let groups = self.options.groups.join(",");
        let detail = format!("{} in {}", self.options.user, groups);

        if self.options.dry_run {
            report.push(ProvisionStep::Groups, StepStatus::Planned, detail);
            return Ok(());
        }

        self.runner.run(
            "usermod",
            &["-aG".to_string(), groups, self.options.user.clone()],
        )?;
        report.push(ProvisionStep::Groups, StepStatus::Changed, detail);
        Ok(())
    }

    fn virtual_env(&self, report: &mut ProvisionReport) -> BitsyResult<()> {
        let venv = self.layout.venv_dir();

        if venv.is_dir() {
            report.push(
                ProvisionStep::VirtualEnv,
                StepStatus::Unchanged,
                format!("{} exists", venv.display()),
            );
            return Ok(());
        }

        if self.options.dry_run {
            report.push(
                ProvisionStep::VirtualEnv,
                StepStatus::Planned,
                format!("create {}", venv.display()),
            );
            return Ok(());
        }

        self.runner.run(
            &self.options.python,
            &[
                "-m".to_string(),
                "venv".to_string(),
                venv.to_string_lossy().into_owned(),
            ],
        )?;
        report.push(
            ProvisionStep::VirtualEnv,
            StepStatus::Changed,
            format!("created {}", venv.display()),
        );
        Ok(())
    }

    fn credentials(&self, report: &mut ProvisionReport) {
        let credentials = self.layout.credentials();

        if credentials.is_file() {
            report.push(
                ProvisionStep::Credentials,
                StepStatus::Unchanged,
                format!("{} present", credentials.display()),
            );
        } else {
            report.push(
                ProvisionStep::Credentials,
                StepStatus::Warning,
                format!(
                    "{} missing; create it with OPENAI_API_KEY=<key>",
                    credentials.display()
                ),
            );
        }
    }

    fn executable(&self, report: &mut ProvisionReport) -> BitsyResult<()> {
        let exec = self.exec_path()?;

        if exec.is_file() {
            report.push(
                ProvisionStep::Executable,
                StepStatus::Unchanged,
                format!("{} present", exec.display()),
            );
        } else {
            report.push(
                ProvisionStep::Executable,
                StepStatus::Warning,
                format!("{} not found; install the bitsy binary", exec.display()),
            );
        }
        Ok(())
    }

    fn service_unit(&self, report: &mut ProvisionReport) -> BitsyResult<()> {
        let path = self.unit_path();
        let rendered = self.unit()?.render();

        let current = std::fs::read_to_string(&path).ok();
        if current.as_deref() == Some(rendered.as_str()) {
            report.push(
                ProvisionStep::Unit,
                StepStatus::Unchanged,
                format!("{} up to date", path.display()),
            );
            return Ok(());
        }

        if self.options.dry_run {
            report.push(
                ProvisionStep::Unit,
                StepStatus::Planned,
                format!("write {} and enable {}", path.display(), self.options.unit_name),
            );
            return Ok(());
        }

        std::fs::write(&path, rendered).map_err(|e| {
            BitsyError::Provision(format!(
                "Failed to write unit {}: {} (run as root)",
                path.display(),
                e
            ))
        })?;

        self.runner.run("systemctl", &["daemon-reload".to_string()])?;
        self.runner.run(
            "systemctl",
            &["enable".to_string(), self.options.unit_name.clone()],
        )?;

        report.push(
            ProvisionStep::Unit,
            StepStatus::Changed,
            format!("installed and enabled {}", path.display()),
        );
        Ok(())
    }
}
