use bitsy::Provisioner;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct UnitArgs {
    /// Service user (default: $SUDO_USER, then $USER)
    #[arg(long)]
    pub user: Option<String>,

    /// Sequencer binary for ExecStart (default: this executable)
    #[arg(long)]
    pub exec: Option<PathBuf>,
}

pub async fn execute(args: UnitArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let mut options = global.load_provision_options()?;
    if let Some(user) = args.user {
        options.user = user;
    }
    if args.exec.is_some() {
        options.exec = args.exec;
    }

    let provisioner = Provisioner::new(options, &global.load_options()?)?;
    print!("{}", provisioner.unit()?.render());
    Ok(())
}
