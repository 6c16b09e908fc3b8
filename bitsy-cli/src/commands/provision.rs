use bitsy::Provisioner;
use bitsy::provision::{ProvisionStep, StepStatus};
use clap::Args;
use comfy_table::{Table, presets::NOTHING};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Service user (default: $SUDO_USER, then $USER)
    #[arg(long)]
    pub user: Option<String>,

    /// Sequencer binary for ExecStart (default: this executable)
    #[arg(long)]
    pub exec: Option<PathBuf>,

    /// Show what would change without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn execute(args: ProvisionArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let mut options = global.load_provision_options()?;
    if let Some(user) = args.user {
        options.user = user;
    }
    if args.exec.is_some() {
        options.exec = args.exec;
    }
    if args.dry_run {
        options.dry_run = true;
    }

    let provisioner = Provisioner::new(options, &global.load_options()?)?;
    let report = provisioner.run()?;

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["STEP", "STATUS", "DETAIL"]);
    for step in &report.steps {
        table.add_row(vec![
            step.step.to_string(),
            step.status.to_string(),
            step.detail.clone(),
        ]);
    }
    println!("{table}");

    for warning in report.warnings() {
        eprintln!("Warning: {}", warning.detail);
    }
    if report.status(ProvisionStep::Hardware) == Some(StepStatus::Changed) {
        eprintln!("Reboot to apply the hardware interface changes.");
    }
    Ok(())
}
