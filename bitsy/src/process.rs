//! PID file handling and process liveness checks.

use bitsy_shared::errors::{BitsyError, BitsyResult};
use std::path::Path;

/// Write a PID file: the decimal PID followed by a newline.
///
/// Any previous content is replaced. The file is never removed by Bitsy;
/// a stale PID file simply names a process that no longer exists.
pub fn write_pid_file(path: &Path, pid: u32) -> BitsyResult<()> {
    std::fs::write(path, format!("{}\n", pid)).map_err(|e| {
        BitsyError::Storage(format!(
            "Failed to write PID file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Read PID from file.
///
/// The file contains a PID as a decimal string, optionally with a trailing newline.
///
/// # Returns
/// * `Ok(pid)` - The PID read from the file
/// * `Err` - If the file cannot be read or parsed
pub fn read_pid_file(path: &Path) -> BitsyResult<u32> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        BitsyError::Storage(format!("Failed to read PID file {}: {}", path.display(), e))
    })?;

    content.trim().parse::<u32>().map_err(|e| {
        BitsyError::Storage(format!(
            "Invalid PID in file {}: '{}' - {}",
            path.display(),
            content.trim(),
            e
        ))
    })
}

/// Check if a process with the given PID exists.
///
/// Uses `libc::kill(pid, 0)` which sends a null signal to check existence.
/// A zombie still counts as alive until it is reaped.
///
/// # Returns
/// * `true` - Process exists
/// * `false` - Process does not exist or permission denied
pub fn is_process_alive(pid: u32) -> bool {
    // PIDs above i32::MAX would wrap into process-group semantics
    if pid == 0 || pid > i32::MAX as u32 {
        return false;
    }
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_is_process_alive_current() {
        assert!(is_process_alive(std::process::id()));
    }

    #[test]
    fn test_is_process_alive_invalid() {
        assert!(!is_process_alive(999999999));
        assert!(!is_process_alive(0));
        assert!(!is_process_alive(u32::MAX));
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bitsy.pid");

        write_pid_file(&path, 4242).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "4242\n");
        assert_eq!(read_pid_file(&path).unwrap(), 4242);
    }

    #[test]
    fn test_write_replaces_previous() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bitsy.pid");

        write_pid_file(&path, 1).unwrap();
        write_pid_file(&path, 77).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "77\n");
    }

    #[test]
    fn test_read_pid_file_no_newline() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "67890").unwrap();

        assert_eq!(read_pid_file(file.path()).unwrap(), 67890);
    }

    #[test]
    fn test_read_pid_file_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not-a-pid").unwrap();

        assert!(read_pid_file(file.path()).is_err());
    }

    #[test]
    fn test_read_pid_file_missing() {
        let result = read_pid_file(Path::new("/nonexistent/path/to/pid.file"));
        assert!(matches!(result, Err(BitsyError::Storage(_))));
    }

    #[test]
    fn test_write_into_missing_dir() {
        let result = write_pid_file(Path::new("/nonexistent/dir/bitsy.pid"), 1);
        assert!(matches!(result, Err(BitsyError::Storage(_))));
    }
}
