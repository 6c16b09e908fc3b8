//! Idempotent line edits for boot configuration files.
//!
//! Used to enable the I2C bus (`dtparam=i2c_arm=on` in config.txt) and load
//! `i2c-dev` at boot (`/etc/modules`).

use bitsy_shared::errors::{BitsyError, BitsyResult};
use std::path::Path;

/// Whether `content` already has `line` as one of its lines.
///
/// Surrounding whitespace is ignored. Commented-out lines do not count.
pub fn has_line(content: &str, line: &str) -> bool {
    let wanted = line.trim();
    content.lines().any(|l| l.trim() == wanted)
}

/// Return `content` with `line` appended, or `None` if it is already present.
pub fn with_line(content: &str, line: &str) -> Option<String> {
    if has_line(content, line) {
        return None;
    }

    let mut updated = String::with_capacity(content.len() + line.len() + 1);
    updated.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(line.trim());
    updated.push('\n');
    Some(updated)
}

/// Ensure `path` contains `line`. A missing file is created.
///
/// Returns `true` when the file was modified.
pub fn ensure_line(path: &Path, line: &str) -> BitsyResult<bool> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(BitsyError::Provision(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )));
        }
    };

    let Some(updated) = with_line(&content, line) else {
        return Ok(false);
    };

    std::fs::write(path, updated).map_err(|e| {
        BitsyError::Provision(format!(
            "Failed to update {}: {} (run as root)",
            path.display(),
            e
        ))
    })?;

    tracing::info!(file = %path.display(), line, "Appended boot configuration line");
    Ok(true)
}
