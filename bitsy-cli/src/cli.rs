use crate::commands::{check, provision, start, unit};
use bitsy::{ProvisionOptions, SequencerOptions};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Bitsy - provision and start the voice robot
#[derive(Parser, Debug)]
#[command(name = "bitsy", author, version, about = "Bitsy robot startup sequencer")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run readiness checks, then launch the voice application
    Start(start::StartArgs),

    /// Show readiness check results without starting anything
    Check(check::CheckArgs),

    /// Report whether the last launched application is still running
    Status,

    /// Grant read/write on the device nodes (run as root before `start`)
    Grant,

    /// Print the systemd unit for this host
    Unit(unit::UnitArgs),

    /// Enable I2C, create the venv and install the systemd unit
    Provision(provision::ProvisionArgs),
}

#[derive(Args, Debug)]
pub struct GlobalFlags {
    /// JSON options file
    #[arg(long, global = true, env = "BITSY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Working directory holding the entry point, credentials and venv
    #[arg(long, global = true, env = "BITSY_HOME")]
    pub work_dir: Option<PathBuf>,

    /// Log diagnostics at info level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalFlags {
    /// Options from the config file (or defaults), with flag overrides applied.
    pub fn load_options(&self) -> anyhow::Result<SequencerOptions> {
        let mut options = match &self.config {
            Some(path) => SequencerOptions::load(path)?,
            None => SequencerOptions::default(),
        };

        if let Some(dir) = &self.work_dir {
            options.work_dir = Some(dir.clone());
        }

        Ok(options)
    }

    /// Provisioning options from the config file's `provision` object (or
    /// defaults), with `global_args` set to the forwarded flags.
    pub fn load_provision_options(&self) -> anyhow::Result<ProvisionOptions> {
        let mut options = match &self.config {
            Some(path) => ProvisionOptions::load(path)?,
            None => ProvisionOptions::default(),
        };
        options.global_args = self.forwarded_args()?;
        Ok(options)
    }

    /// Arguments that reproduce these flags in front of a subcommand.
    ///
    /// Paths are made absolute so the result is usable from a unit file.
    pub fn forwarded_args(&self) -> anyhow::Result<Vec<String>> {
        let mut args = Vec::new();

        if let Some(config) = &self.config {
            args.push("--config".to_string());
            args.push(absolute(config)?.display().to_string());
        }
        if let Some(dir) = &self.work_dir {
            args.push("--work-dir".to_string());
            args.push(absolute(dir)?.display().to_string());
        }

        Ok(args)
    }
}

fn absolute(path: &std::path::Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start() {
        let cli = Cli::parse_from(["bitsy", "--work-dir", "/srv/bitsy", "start", "--settle-delay", "0"]);
        assert_eq!(cli.global.work_dir, Some(PathBuf::from("/srv/bitsy")));
        match cli.command {
            Commands::Start(args) => assert_eq!(args.settle_delay, Some(0)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flag_after_subcommand() {
        let cli = Cli::parse_from(["bitsy", "check", "--all", "-v"]);
        assert!(cli.global.verbose);
    }

    #[test]
    fn test_parse_grant() {
        let cli = Cli::parse_from(["bitsy", "--config", "/etc/bitsy.json", "grant"]);
        assert!(matches!(cli.command, Commands::Grant));
    }

    #[test]
    fn test_provision_defaults_without_config() {
        let flags = GlobalFlags {
            config: None,
            work_dir: Some(PathBuf::from("/srv/bitsy")),
            verbose: false,
        };
        let options = flags.load_provision_options().unwrap();
        assert_eq!(
            options.global_args,
            vec!["--work-dir".to_string(), "/srv/bitsy".to_string()]
        );
        assert_eq!(options.exec_args, vec!["start".to_string()]);
    }

    #[test]
    fn test_forwarded_args() {
        let flags = GlobalFlags {
            config: Some(PathBuf::from("/etc/bitsy.json")),
            work_dir: None,
            verbose: false,
        };
        assert_eq!(
            flags.forwarded_args().unwrap(),
            vec!["--config".to_string(), "/etc/bitsy.json".to_string()]
        );
    }
}
