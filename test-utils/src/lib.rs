//! Test fixtures for Bitsy.
//!
//! [`FakeHost`] lays out a temporary directory like a provisioned Raspberry
//! Pi, with a GPIO directory, device nodes (regular files), a working
//! directory holding the entry point and credentials, and optionally a
//! virtual environment. Pieces can be removed to exercise failing checks.

use bitsy::provision::{CommandRunner, ProvisionOptions};
use bitsy::{BitsyError, BitsyResult, LaunchSpec, Launcher, SequencerOptions};
use parking_lot::Mutex;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Entry script: records its own PID so tests can compare it with the PID file.
pub const PID_ECHO_SCRIPT: &str = "echo $$ > child.pid\n";

/// Entry script: records the JACK variables it was started with.
pub const ENV_ECHO_SCRIPT: &str =
    "echo \"$JACK_NO_START_SERVER $JACK_NO_AUDIO_RESERVATION\" > child.env\n";

/// Venv interpreter stand-in: runs the entry script with /bin/sh.
const VENV_PYTHON: &str = "#!/bin/sh\nexec /bin/sh \"$@\"\n";

/// PID reported by [`RecordingLauncher`].
pub const FAKE_PID: u32 = 4242;

pub struct FakeHost {
    _temp_dir: TempDir, // Dropped after test
    root: PathBuf,
}

impl FakeHost {
    /// A host on which every readiness check passes, except the optional venv.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let host = Self {
            _temp_dir: temp_dir,
            root,
        };

        std::fs::create_dir_all(host.gpio_dir()).unwrap();
        std::fs::create_dir_all(host.audio_device().parent().unwrap()).unwrap();
        for node in [host.i2c_device(), host.audio_device()] {
            std::fs::write(&node, "").unwrap();
            std::fs::set_permissions(&node, std::fs::Permissions::from_mode(0o600)).unwrap();
        }

        std::fs::create_dir_all(host.work_dir()).unwrap();
        std::fs::write(host.entry_point(), PID_ECHO_SCRIPT).unwrap();
        std::fs::write(host.credentials(), "OPENAI_API_KEY=test\n").unwrap();

        host
    }

    pub fn without_gpio(self) -> Self {
        std::fs::remove_dir_all(self.gpio_dir()).unwrap();
        self
    }

    pub fn without_i2c(self) -> Self {
        std::fs::remove_file(self.i2c_device()).unwrap();
        self
    }

    pub fn without_audio(self) -> Self {
        std::fs::remove_file(self.audio_device()).unwrap();
        self
    }

    pub fn without_entry_point(self) -> Self {
        std::fs::remove_file(self.entry_point()).unwrap();
        self
    }

    pub fn without_credentials(self) -> Self {
        std::fs::remove_file(self.credentials()).unwrap();
        self
    }

    /// Add a virtual environment whose interpreter runs scripts with /bin/sh.
    pub fn with_venv(self) -> Self {
        let bin = self.work_dir().join("venv").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let python = bin.join("python3");
        std::fs::write(&python, VENV_PYTHON).unwrap();
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755)).unwrap();
        self
    }

    pub fn with_entry_script(self, script: &str) -> Self {
        std::fs::write(self.entry_point(), script).unwrap();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn gpio_dir(&self) -> PathBuf {
        self.root.join("sys/class/gpio")
    }

    pub fn i2c_device(&self) -> PathBuf {
        self.root.join("dev/i2c-1")
    }

    pub fn audio_device(&self) -> PathBuf {
        self.root.join("dev/snd/controlC0")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root.join("home/pi/bitsy")
    }

    pub fn entry_point(&self) -> PathBuf {
        self.work_dir().join("chatgpt.py")
    }

    pub fn credentials(&self) -> PathBuf {
        self.work_dir().join(".env")
    }

    pub fn log_file(&self) -> PathBuf {
        self.work_dir().join("bitsy.log")
    }

    pub fn pid_file(&self) -> PathBuf {
        self.work_dir().join("bitsy.pid")
    }

    /// File written by [`PID_ECHO_SCRIPT`].
    pub fn child_pid_file(&self) -> PathBuf {
        self.work_dir().join("child.pid")
    }

    /// File written by [`ENV_ECHO_SCRIPT`].
    pub fn child_env_file(&self) -> PathBuf {
        self.work_dir().join("child.env")
    }

    /// Sequencer options pointing at this host, with no settle delay and
    /// /bin/sh standing in for the system Python.
    pub fn options(&self) -> SequencerOptions {
        SequencerOptions {
            work_dir: Some(self.work_dir()),
            gpio_dir: self.gpio_dir(),
            i2c_device: self.i2c_device(),
            audio_device: self.audio_device(),
            system_interpreter: PathBuf::from("/bin/sh"),
            settle_delay_secs: 0,
            ..Default::default()
        }
    }

    /// Write [`Self::options`] as a JSON options file and return its path.
    pub fn write_config(&self) -> PathBuf {
        let path = self.root.join("bitsy.json");
        let json = serde_json::to_string_pretty(&self.options()).unwrap();
        std::fs::write(&path, json).unwrap();
        path
    }

    /// Like [`Self::write_config`], with `provision` nested in the file.
    pub fn write_config_with(&self, provision: &ProvisionOptions) -> PathBuf {
        let path = self.root.join("bitsy.json");
        let mut json = serde_json::to_value(self.options()).unwrap();
        json["provision"] = serde_json::to_value(provision).unwrap();
        std::fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();
        path
    }

    /// Provisioning options confined to this host.
    pub fn provision_options(&self) -> ProvisionOptions {
        let boot = self.root.join("boot/firmware");
        let etc = self.root.join("etc");
        let unit_dir = etc.join("systemd/system");
        let bin = self.root.join("usr/local/bin");
        for dir in [&boot, &unit_dir, &bin] {
            std::fs::create_dir_all(dir).unwrap();
        }
        let exec = bin.join("bitsy");
        if !exec.exists() {
            std::fs::write(&exec, "").unwrap();
        }

        ProvisionOptions {
            user: "pi".to_string(),
            exec: Some(exec),
            unit_dir,
            boot_config: boot.join("config.txt"),
            modules_file: etc.join("modules"),
            python: "python3".to_string(),
            ..Default::default()
        }
    }

    /// Permission bits of a file on this host.
    pub fn mode(&self, path: &Path) -> u32 {
        std::fs::metadata(path).unwrap().permissions().mode() & 0o7777
    }

    pub fn log_contents(&self) -> String {
        std::fs::read_to_string(self.log_file()).unwrap_or_default()
    }
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll until `path` holds a complete line, for up to five seconds.
pub fn wait_for_line(path: &Path) -> Option<String> {
    for _ in 0..100 {
        if let Ok(content) = std::fs::read_to_string(path)
            && content.ends_with('\n')
        {
            return Some(content);
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    None
}

/// Launcher that records specs instead of spawning.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    launches: Mutex<Vec<LaunchSpec>>,
    fail: bool,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A launcher whose every launch fails.
    pub fn failing() -> Self {
        Self {
            launches: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn launches(&self) -> Vec<LaunchSpec> {
        self.launches.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.launches.lock().len()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, spec: &LaunchSpec) -> BitsyResult<u32> {
        self.launches.lock().push(spec.clone());
        if self.fail {
            return Err(BitsyError::Launch(format!(
                "Failed to spawn {}",
                spec.program.display()
            )));
        }
        Ok(FAKE_PID)
    }
}

/// Command runner that records invocations instead of running them.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<String>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocations as space-joined command lines.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[String]) -> BitsyResult<()> {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.commands.lock().push(line);
        Ok(())
    }
}
