//! Configuration for the startup sequencer.

use bitsy_shared::constants::{files, hardware, interpreter, timing};
use bitsy_shared::errors::{BitsyError, BitsyResult};
use bitsy_shared::layout::StartupLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Paths and knobs for one sequencer invocation.
///
/// Every field has a default matching a stock Bitsy image, so an empty JSON
/// object (`{}`) is a valid options file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SequencerOptions {
    /// Working directory holding the entry point, credentials and venv.
    ///
    /// Default: the current directory of the sequencer process
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// GPIO sysfs interface directory.
    ///
    /// Default: /sys/class/gpio
    #[serde(default = "default_gpio_dir")]
    pub gpio_dir: PathBuf,

    /// I2C device node. Checked, then made world read/write.
    ///
    /// Default: /dev/i2c-1
    #[serde(default = "default_i2c_device")]
    pub i2c_device: PathBuf,

    /// Audio device node. Made world read/write, never checked.
    ///
    /// Default: /dev/snd/controlC0
    #[serde(default = "default_audio_device")]
    pub audio_device: PathBuf,

    /// Application entry file, relative to `work_dir`.
    #[serde(default = "default_entry_point")]
    pub entry_point: PathBuf,

    /// Fail when the entry file is missing.
    ///
    /// When false the entry file is not checked and a missing file surfaces
    /// only as an application crash.
    /// Default: true
    #[serde(default = "default_true")]
    pub require_entry_point: bool,

    /// Virtual environment directory, relative to `work_dir`.
    #[serde(default = "default_venv_dir")]
    pub venv_dir: PathBuf,

    /// Credential file, relative to `work_dir`.
    #[serde(default = "default_credentials")]
    pub credentials_file: PathBuf,

    /// Interpreter used when the virtual environment is missing.
    ///
    /// Default: python3 (resolved through PATH)
    #[serde(default = "default_system_interpreter")]
    pub system_interpreter: PathBuf,

    /// Append-only startup log, relative to `work_dir`.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// PID file, relative to `work_dir`.
    #[serde(default = "default_pid_file")]
    pub pid_file: PathBuf,

    /// Unconditional sleep before the hardware checks, in seconds.
    ///
    /// Default: 10
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,

    /// Append the application's stdout/stderr to the startup log.
    ///
    /// Default: true
    #[serde(default = "default_true")]
    pub capture_output: bool,
}

fn default_gpio_dir() -> PathBuf {
    PathBuf::from(hardware::GPIO_DIR)
}

fn default_i2c_device() -> PathBuf {
    PathBuf::from(hardware::I2C_DEVICE)
}

fn default_audio_device() -> PathBuf {
    PathBuf::from(hardware::AUDIO_DEVICE)
}

fn default_entry_point() -> PathBuf {
    PathBuf::from(files::ENTRY_POINT)
}

fn default_venv_dir() -> PathBuf {
    PathBuf::from(files::VENV_DIR)
}

fn default_credentials() -> PathBuf {
    PathBuf::from(files::CREDENTIALS)
}

fn default_system_interpreter() -> PathBuf {
    PathBuf::from(interpreter::SYSTEM)
}

fn default_log_file() -> PathBuf {
    PathBuf::from(files::LOG_FILE)
}

fn default_pid_file() -> PathBuf {
    PathBuf::from(files::PID_FILE)
}

fn default_settle_delay_secs() -> u64 {
    timing::SETTLE_DELAY_SECS
}

fn default_true() -> bool {
    true
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self {
            work_dir: None,
            gpio_dir: default_gpio_dir(),
            i2c_device: default_i2c_device(),
            audio_device: default_audio_device(),
            entry_point: default_entry_point(),
            require_entry_point: true,
            venv_dir: default_venv_dir(),
            credentials_file: default_credentials(),
            system_interpreter: default_system_interpreter(),
            log_file: default_log_file(),
            pid_file: default_pid_file(),
            settle_delay_secs: default_settle_delay_secs(),
            capture_output: true,
        }
    }
}

impl SequencerOptions {
    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> BitsyResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BitsyError::Config(format!(
                "Failed to read options file {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            BitsyError::Config(format!(
                "Invalid options file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Resolve the working directory, falling back to the current directory.
    pub fn resolve_work_dir(&self) -> BitsyResult<PathBuf> {
        match &self.work_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().map_err(|e| {
                BitsyError::Config(format!("Cannot determine current directory: {}", e))
            }),
        }
    }

    /// Build the working-directory layout these options describe.
    pub fn layout(&self) -> BitsyResult<StartupLayout> {
        Ok(StartupLayout::new(self.resolve_work_dir()?)
            .with_entry_point(&self.entry_point)
            .with_venv_dir(&self.venv_dir)
            .with_credentials(&self.credentials_file)
            .with_log_file(&self.log_file)
            .with_pid_file(&self.pid_file))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    /// Device nodes that receive read/write permission before launch, in order.
    pub fn device_nodes(&self) -> [&Path; 2] {
        [self.i2c_device.as_path(), self.audio_device.as_path()]
    }
}
