//! Working-directory layout for the sequencer.
//!
//! ```text
//! {root}/                # working directory (BITSY_HOME)
//! ├── chatgpt.py         # application entry point
//! ├── .env               # credentials
//! ├── venv/              # optional virtual environment
//! │   └── bin/python3
//! ├── bitsy.log          # append-only startup log
//! └── bitsy.pid          # PID of the last launched application
//! ```
//!
//! Every name may also be absolute, in which case it is used as-is.

use crate::constants::{files, interpreter};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct StartupLayout {
    root: PathBuf,
    entry_point: PathBuf,
    venv_dir: PathBuf,
    credentials: PathBuf,
    log_file: PathBuf,
    pid_file: PathBuf,
}

impl StartupLayout {
    /// Layout with the default file names under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entry_point: PathBuf::from(files::ENTRY_POINT),
            venv_dir: PathBuf::from(files::VENV_DIR),
            credentials: PathBuf::from(files::CREDENTIALS),
            log_file: PathBuf::from(files::LOG_FILE),
            pid_file: PathBuf::from(files::PID_FILE),
        }
    }

    pub fn with_entry_point(mut self, name: impl Into<PathBuf>) -> Self {
        self.entry_point = name.into();
        self
    }

    pub fn with_venv_dir(mut self, name: impl Into<PathBuf>) -> Self {
        self.venv_dir = name.into();
        self
    }

    pub fn with_credentials(mut self, name: impl Into<PathBuf>) -> Self {
        self.credentials = name.into();
        self
    }

    pub fn with_log_file(mut self, name: impl Into<PathBuf>) -> Self {
        self.log_file = name.into();
        self
    }

    pub fn with_pid_file(mut self, name: impl Into<PathBuf>) -> Self {
        self.pid_file = name.into();
        self
    }

    /// Working directory: {root}
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entry point: {root}/chatgpt.py
    pub fn entry_point(&self) -> PathBuf {
        self.root.join(&self.entry_point)
    }

    /// Virtual environment: {root}/venv
    pub fn venv_dir(&self) -> PathBuf {
        self.root.join(&self.venv_dir)
    }

    /// Interpreter inside the virtual environment: {root}/venv/bin/python3
    pub fn venv_interpreter(&self) -> PathBuf {
        self.venv_dir().join(interpreter::VENV_RELATIVE)
    }

    /// Credentials: {root}/.env
    pub fn credentials(&self) -> PathBuf {
        self.root.join(&self.credentials)
    }

    /// Startup log: {root}/bitsy.log
    pub fn log_file(&self) -> PathBuf {
        self.root.join(&self.log_file)
    }

    /// PID file: {root}/bitsy.pid
    pub fn pid_file(&self) -> PathBuf {
        self.root.join(&self.pid_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let layout = StartupLayout::new("/home/pi/bitsy");
        assert_eq!(layout.root(), Path::new("/home/pi/bitsy"));
        assert_eq!(
            layout.entry_point(),
            PathBuf::from("/home/pi/bitsy/chatgpt.py")
        );
        assert_eq!(
            layout.venv_interpreter(),
            PathBuf::from("/home/pi/bitsy/venv/bin/python3")
        );
        assert_eq!(layout.credentials(), PathBuf::from("/home/pi/bitsy/.env"));
        assert_eq!(layout.pid_file(), PathBuf::from("/home/pi/bitsy/bitsy.pid"));
    }

    #[test]
    fn test_absolute_override() {
        let layout = StartupLayout::new("/home/pi/bitsy").with_log_file("/var/log/bitsy.log");
        assert_eq!(layout.log_file(), PathBuf::from("/var/log/bitsy.log"));
    }
}
