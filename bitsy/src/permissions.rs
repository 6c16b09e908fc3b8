//! Permission grants on hardware device nodes.

use bitsy_shared::errors::{BitsyError, BitsyResult};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Set the permission bits of `path` to `mode`.
///
/// Only the low 12 bits of `mode` are used. Other metadata is untouched.
/// Nothing is changed when the node already has `mode`, so an unprivileged
/// caller succeeds after a privileged one has granted access.
pub fn grant(path: &Path, mode: u32) -> BitsyResult<()> {
    let mode = mode & 0o7777;
    if mode_of(path).ok() == Some(mode) {
        return Ok(());
    }

    let permissions = std::fs::Permissions::from_mode(mode);
    std::fs::set_permissions(path, permissions).map_err(|e| {
        let reason = if e.kind() == std::io::ErrorKind::PermissionDenied {
            "access denied (run as root or add a udev rule)".to_string()
        } else {
            e.to_string()
        };
        BitsyError::Permission(format!(
            "Failed to set mode {:04o} on {}: {}",
            mode,
            path.display(),
            reason
        ))
    })
}

/// Current permission bits of `path`.
pub fn mode_of(path: &Path) -> BitsyResult<u32> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        BitsyError::Permission(format!("Failed to stat {}: {}", path.display(), e))
    })?;
    Ok(metadata.permissions().mode() & 0o7777)
}
