//! Detached process launching for the voice application.

use bitsy_shared::errors::{BitsyError, BitsyResult};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Everything needed to start the application process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Interpreter or executable to run
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Working directory of the child
    pub cwd: PathBuf,
    /// Variables added on top of the inherited environment
    pub envs: Vec<(String, String)>,
    /// File receiving the child's stdout and stderr (appended).
    /// `None` discards the output.
    pub output: Option<PathBuf>,
}

impl LaunchSpec {
    /// Value of an added environment variable.
    pub fn env(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Starts the application and returns its PID without waiting on it.
pub trait Launcher: Send + Sync {
    fn launch(&self, spec: &LaunchSpec) -> BitsyResult<u32>;
}

/// Launches the application as a detached child.
///
/// The child gets its own process group, so a signal sent to the
/// sequencer's group does not reach it, and stdin is `/dev/null`. The
/// handle is dropped right after spawning; the child is never waited on.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedLauncher;

impl Launcher for DetachedLauncher {
    fn launch(&self, spec: &LaunchSpec) -> BitsyResult<u32> {
        use std::os::unix::process::CommandExt;

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.cwd)
            .envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .process_group(0);

        match &spec.output {
            Some(path) => {
                let stdout = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| {
                        BitsyError::Launch(format!(
                            "Failed to open output file {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                let stderr = stdout.try_clone()?;
                cmd.stdout(Stdio::from(stdout));
                cmd.stderr(Stdio::from(stderr));
            }
            None => {
                cmd.stdout(Stdio::null());
                cmd.stderr(Stdio::null());
            }
        }

        let child = cmd.spawn().map_err(|e| {
            let err_msg = format!(
                "Failed to spawn {} {}: {}",
                spec.program.display(),
                spec.args.join(" "),
                e
            );
            tracing::error!("{}", err_msg);
            BitsyError::Launch(err_msg)
        })?;

        let pid = child.id();
        tracing::debug!(pid, program = %spec.program.display(), "Spawned detached child");

        Ok(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec(dir: &TempDir, script: &str) -> LaunchSpec {
        LaunchSpec {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".into(), script.into()],
            cwd: dir.path().to_path_buf(),
            envs: vec![("BITSY_TEST".into(), "yes".into())],
            output: Some(dir.path().join("out.log")),
        }
    }

    fn wait_for(path: &std::path::Path) -> String {
        for _ in 0..100 {
            if let Ok(content) = std::fs::read_to_string(path)
                && content.ends_with('\n')
            {
                return content;
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
        panic!("{} was never written", path.display());
    }

    #[test]
    fn test_launch_passes_env_and_cwd() {
        let dir = TempDir::new().unwrap();
        let pid = DetachedLauncher
            .launch(&spec(&dir, "echo \"$BITSY_TEST $$\" > marker"))
            .unwrap();

        let content = wait_for(&dir.path().join("marker"));
        assert_eq!(content.trim(), format!("yes {}", pid));
    }

    #[test]
    fn test_launch_appends_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.log");
        std::fs::write(&out, "before\n").unwrap();

        DetachedLauncher
            .launch(&spec(&dir, "echo hello; echo oops >&2; touch done"))
            .unwrap();

        let done = dir.path().join("done");
        for _ in 0..100 {
            if done.exists() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }

        let content = std::fs::read_to_string(&out).unwrap();
        assert!(content.starts_with("before\n"));
        assert!(content.contains("hello"));
        assert!(content.contains("oops"));
    }

    #[test]
    fn test_launch_missing_program() {
        let dir = TempDir::new().unwrap();
        let spec = LaunchSpec {
            program: dir.path().join("no-such-python"),
            ..spec(&dir, "true")
        };

        let err = DetachedLauncher.launch(&spec).unwrap_err();
        assert!(matches!(err, BitsyError::Launch(_)));
    }

    #[test]
    fn test_env_lookup() {
        let dir = TempDir::new().unwrap();
        let spec = spec(&dir, "true");
        assert_eq!(spec.env("BITSY_TEST"), Some("yes"));
        assert_eq!(spec.env("MISSING"), None);
    }
}
