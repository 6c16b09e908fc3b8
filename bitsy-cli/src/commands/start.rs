use bitsy::StartupSequencer;
use clap::Args;

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Seconds to wait before the hardware checks (overrides the options file)
    #[arg(long)]
    pub settle_delay: Option<u64>,

    /// Do not require the entry point to exist
    #[arg(long)]
    pub skip_entry_check: bool,
}

pub async fn execute(args: StartArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let mut options = global.load_options()?;

    if let Some(delay) = args.settle_delay {
        options.settle_delay_secs = delay;
    }
    if args.skip_entry_check {
        options.require_entry_point = false;
    }

    let sequencer = StartupSequencer::new(options)?;
    let report = sequencer.run().await?;

    tracing::info!(
        pid = report.pid,
        interpreter = %report.interpreter.display(),
        "Application launched"
    );
    println!("{}", report.pid);
    Ok(())
}
