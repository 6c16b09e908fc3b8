//! Entry point for the `bitsy` command.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };

    // Logs go to stderr; under systemd they land in the journal
    if let Err(e) = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .try_init()
    {
        eprintln!("Failed to initialize tracing: {}", e);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match cli.command {
        Commands::Start(args) => commands::start::execute(args, &cli.global).await,
        Commands::Check(args) => commands::check::execute(args, &cli.global).await,
        Commands::Status => commands::status::execute(&cli.global).await,
        Commands::Grant => commands::grant::execute(&cli.global).await,
        Commands::Unit(args) => commands::unit::execute(args, &cli.global).await,
        Commands::Provision(args) => commands::provision::execute(args, &cli.global).await,
    }
}
