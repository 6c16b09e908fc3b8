//! systemd unit for the startup sequencer.
//!
//! The sequencer exits as soon as the application is spawned, so the unit is
//! `Type=forking` and systemd tracks the application through the PID file.
//! `Restart=on-failure` is the only crash recovery Bitsy has.
//!
//! The service runs as an unprivileged user, but the device nodes belong to
//! root. An `ExecStartPre=+` line runs `<exec> grant` with full privileges
//! before `start`, so the grant succeeds and the later grant by `start` finds
//! the modes already set.

use bitsy_shared::constants::service;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceUnit {
    pub description: String,
    pub user: String,
    pub working_directory: PathBuf,
    /// Sequencer binary
    pub exec: PathBuf,
    /// Arguments after the binary
    pub args: Vec<String>,
    /// Arguments of the privileged `ExecStartPre=+` step, if any
    pub grant_args: Option<Vec<String>>,
    pub pid_file: PathBuf,
    pub restart_sec: u64,
    pub after: Vec<String>,
}

impl ServiceUnit {
    /// Unit running `<exec> grant` as root, then `<exec> start` as `user`
    /// in `working_directory`.
    pub fn new(
        user: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        exec: impl Into<PathBuf>,
        pid_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            description: "Bitsy voice robot".to_string(),
            user: user.into(),
            working_directory: working_directory.into(),
            exec: exec.into(),
            args: vec!["start".to_string()],
            grant_args: Some(vec!["grant".to_string()]),
            pid_file: pid_file.into(),
            restart_sec: service::RESTART_SEC,
            after: vec!["sound.target".into(), "network-online.target".into()],
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Replace the privileged pre-start arguments. `None` drops the step.
    pub fn with_grant_args(mut self, args: Option<Vec<String>>) -> Self {
        self.grant_args = args;
        self
    }

    pub fn exec_start(&self) -> String {
        self.command_line(&self.args)
    }

    /// `ExecStartPre=` value, with the `+` full-privilege prefix.
    pub fn exec_start_pre(&self) -> Option<String> {
        self.grant_args
            .as_ref()
            .map(|args| format!("+{}", self.command_line(args)))
    }

    fn command_line(&self, args: &[String]) -> String {
        let mut line = self.exec.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Render the unit file.
    pub fn render(&self) -> String {
        let after = self.after.join(" ");
        let mut unit = String::new();

        // Writing to a String cannot fail
        let _ = writeln!(unit, "[Unit]");
        let _ = writeln!(unit, "Description={}", self.description);
        let _ = writeln!(unit, "After={}", after);
        let _ = writeln!(unit, "Wants={}", after);
        let _ = writeln!(unit);
        let _ = writeln!(unit, "[Service]");
        let _ = writeln!(unit, "Type=forking");
        let _ = writeln!(unit, "User={}", self.user);
        let _ = writeln!(
            unit,
            "WorkingDirectory={}",
            self.working_directory.display()
        );
        if let Some(pre) = self.exec_start_pre() {
            let _ = writeln!(unit, "ExecStartPre={}", pre);
        }
        let _ = writeln!(unit, "ExecStart={}", self.exec_start());
        let _ = writeln!(unit, "PIDFile={}", self.pid_file.display());
        let _ = writeln!(unit, "Restart=on-failure");
        let _ = writeln!(unit, "RestartSec={}", self.restart_sec);
        let _ = writeln!(unit);
        let _ = writeln!(unit, "[Install]");
        let _ = writeln!(unit, "WantedBy=multi-user.target");

        unit
    }
}
