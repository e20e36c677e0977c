use std::fs;
use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use dump_harness::RunContext;
use dump_utils::SystemRunner;

use super::{exit_code, load_config, lookup, write_status};
use crate::Cli;

#[derive(Args)]
pub struct RunArgs {
    /// Scenario to replay
    #[arg(default_value = "props")]
    scenario: String,

    /// Test id isolating this run's files (defaults to the scenario name)
    #[arg(long)]
    id: Option<String>,

    /// Keep repositories and working copy after a passing run
    #[arg(long)]
    keep: bool,

    /// Arguments passed to the candidate before the repository URL
    #[arg(last = true)]
    candidate_args: Vec<String>,
}

pub fn run(args: &RunArgs, cli: &Cli) -> Result<i32> {
    let config = load_config(cli)?;
    let scenario = lookup(&args.scenario)?;
    let ctx = RunContext::new(args.id.as_deref().unwrap_or(scenario.name), &config)?;
    let runner = SystemRunner::with_timeout(config.timeout());

    let report = match dump_harness::run(&ctx, scenario, &args.candidate_args, &runner) {
        Ok(report) => report,
        Err(e) => {
            if let Some(log) = e.log_path() {
                eprintln!("see {} for the full transcript", log.display());
            }
            return Err(e.into());
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_status(&mut out, &report)?;
    if let Some(ref diff_path) = report.diff_path {
        out.write_all(&fs::read(diff_path)?)?;
    }
    out.flush()?;

    if report.outcome().is_pass() && !args.keep {
        ctx.clean()?;
    }
    Ok(exit_code(&report))
}
