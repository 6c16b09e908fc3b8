use bitsy::check::Requirement;
use bitsy::{EvaluationMode, StartupSequencer};
use clap::Args;
use comfy_table::{Table, presets::NOTHING};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Keep evaluating after a required check fails
    #[arg(short, long)]
    pub all: bool,
}

pub async fn execute(args: CheckArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let sequencer = StartupSequencer::new(global.load_options()?)?;
    let mode = if args.all {
        EvaluationMode::Exhaustive
    } else {
        EvaluationMode::StopAtFirstFailure
    };
    let report = sequencer.evaluate(mode);

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["CHECK", "REQUIRED", "STATUS", "PATH"]);

    let mut hints = Vec::new();
    for check in sequencer.checks() {
        let status = match report.outcome(check.id) {
            Some(outcome) if outcome.passed() => "passed",
            Some(_) => {
                if let Some(hint) = &check.hint {
                    hints.push(format!("{}: {}", check.id, hint));
                }
                if check.requirement == Requirement::Required {
                    "FAILED"
                } else {
                    "warning"
                }
            }
            None => "skipped",
        };
        let required = match check.requirement {
            Requirement::Required => "yes",
            Requirement::Optional => "no",
        };

        table.add_row(vec![
            check.id.to_string(),
            required.to_string(),
            status.to_string(),
            check.probe.path().display().to_string(),
        ]);
    }

    println!("{table}");
    for hint in &hints {
        println!("  {}", hint);
    }

    if let Some(fatal) = report.fatal() {
        anyhow::bail!(
            "{} not ready: {}",
            fatal.check.id,
            fatal.check.failure_message
        );
    }
    Ok(())
}
