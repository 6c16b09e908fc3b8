//! Stage 4: launch.
//!
//! Starts the application detached and records its PID.

use crate::launcher::{LaunchSpec, Launcher};
use crate::options::SequencerOptions;
use crate::process::write_pid_file;
use crate::sequencer::LaunchReport;
use crate::startup_log::StartupLog;
use bitsy_shared::constants::envs::AUDIO_SUPPRESSION;
use bitsy_shared::errors::BitsyResult;
use bitsy_shared::layout::StartupLayout;
use std::path::Path;

/// Build the launch spec.
///
/// Uses the venv interpreter when the venv passed its check, otherwise the
/// system interpreter. The JACK suppression variables are added to the
/// child's environment only.
pub fn prepare(options: &SequencerOptions, layout: &StartupLayout, venv_ready: bool) -> LaunchSpec {
    let program = if venv_ready {
        layout.venv_interpreter()
    } else {
        options.system_interpreter.clone()
    };

    let envs = AUDIO_SUPPRESSION
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    LaunchSpec {
        program,
        args: vec![layout.entry_point().to_string_lossy().into_owned()],
        cwd: layout.root().to_path_buf(),
        envs,
        output: options.capture_output.then(|| layout.log_file()),
    }
}

pub fn run(
    spec: LaunchSpec,
    launcher: &dyn Launcher,
    pid_file: &Path,
    used_venv: bool,
    log: &dyn StartupLog,
) -> BitsyResult<LaunchReport> {
    let pid = match launcher.launch(&spec) {
        Ok(pid) => pid,
        Err(e) => {
            log.error(&e.to_string());
            return Err(e);
        }
    };

    if let Err(e) = write_pid_file(pid_file, pid) {
        log.error(&format!("{} (application is running as PID {})", e, pid));
        return Err(e);
    }

    log.info(&format!("Bitsy started with PID {}", pid));

    Ok(LaunchReport {
        pid,
        interpreter: spec.program,
        pid_file: pid_file.to_path_buf(),
        used_venv,
    })
}
