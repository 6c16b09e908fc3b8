//! Stage 3: device permissions.
//!
//! Grants read/write on the device nodes the application talks to. A failed
//! grant is logged and the sequence continues; the application may still
//! have access through group membership. Grants already applied are never
//! rolled back.

use crate::permissions::grant;
use crate::startup_log::StartupLog;
use bitsy_shared::constants::hardware::DEVICE_MODE;
use std::path::Path;

/// Returns the number of nodes whose mode was changed.
pub fn run(nodes: &[&Path], log: &dyn StartupLog) -> usize {
    let mut granted = 0;

    for node in nodes {
        match grant(node, DEVICE_MODE) {
            Ok(()) => {
                tracing::debug!(node = %node.display(), "Granted device access");
                granted += 1;
            }
            Err(e) => log.warn(&e.to_string()),
        }
    }

    granted
}
