pub mod list;
pub mod run;
pub mod steps;
pub mod suite;

use std::io::Write;

use anyhow::Result;
use clap::Subcommand;
use dump_harness::{HarnessConfig, HarnessError, Outcome, RunReport, Scenario};

use crate::Cli;

/// Exit status of a run whose dumps diverged.
pub const EXIT_MISMATCH: i32 = 1;
/// Exit status of a harness failure.
pub const EXIT_ERROR: i32 = 128;

#[derive(Subcommand)]
pub enum Commands {
    /// Run one scenario against the candidate dumper
    Run(run::RunArgs),
    /// Run every scenario under each candidate mode in parallel
    Suite(suite::SuiteArgs),
    /// List the built-in scenarios
    List(list::ListArgs),
    /// Show the step table of a scenario
    Steps(steps::StepsArgs),
}

pub fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::Run(args) => run::run(args, &cli),
        Commands::Suite(args) => suite::run(args, &cli),
        Commands::List(args) => list::run(args),
        Commands::Steps(args) => steps::run(args),
    }
}

/// Configuration from file and environment, then command-line overrides.
fn load_config(cli: &Cli) -> Result<HarnessConfig> {
    let mut config = HarnessConfig::load(cli.config.as_deref())?;
    if let Some(ref candidate) = cli.candidate {
        config.candidate.program = candidate.clone();
    }
    if let Some(ref work_root) = cli.work_root {
        config.work_root = work_root.clone();
    }
    config.validate()?;
    Ok(config)
}

fn lookup(name: &str) -> Result<&'static Scenario> {
    dump_harness::scenario::lookup(name)
        .ok_or_else(|| HarnessError::UnknownScenario(name.to_string()).into())
}

fn exit_code(report: &RunReport) -> i32 {
    match report.outcome() {
        Outcome::Pass => 0,
        Outcome::Fail(_) => EXIT_MISMATCH,
    }
}

/// One status line for a finished run.
fn write_status(out: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    match report.outcome() {
        Outcome::Pass => writeln!(
            out,
            "PASS {} ({}, {} revisions)",
            report.test_id, report.scenario, report.revisions
        ),
        Outcome::Fail(kind) => writeln!(
            out,
            "FAIL {} ({}): {kind}, {}",
            report.test_id,
            report.scenario,
            report.comparison.summary()
        ),
    }
}
