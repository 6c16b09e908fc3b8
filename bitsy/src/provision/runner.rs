//! External command execution for provisioning.

use bitsy_shared::errors::{BitsyError, BitsyResult};
use std::process::{Command, Stdio};

/// Runs one external command to completion.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> BitsyResult<()>;
}

/// Runs commands on the host, inheriting stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> BitsyResult<()> {
        tracing::info!(program, args = ?args, "Running command");

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| BitsyError::Provision(format!("Failed to run {}: {}", program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(BitsyError::Provision(format!(
                "{} {} exited with {}",
                program,
                args.join(" "),
                status
            )))
        }
    }
}
