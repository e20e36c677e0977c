use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use dump_harness::{HarnessConfig, HarnessError, RunContext, RunReport, Scenario};
use dump_utils::SystemRunner;
use rayon::prelude::*;

use super::{exit_code, load_config, write_status, EXIT_ERROR};
use crate::Cli;

#[derive(Args)]
pub struct SuiteArgs {
    /// Number of runs in flight (defaults to the number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Whitespace-separated candidate arguments; repeat for several modes
    #[arg(long = "mode", allow_hyphen_values = true)]
    modes: Vec<String>,

    /// Keep repositories and working copies of passing runs
    #[arg(long)]
    keep: bool,
}

struct Job {
    scenario: &'static Scenario,
    test_id: String,
    args: Vec<String>,
}

/// Every scenario crossed with every mode, ids `<scenario>-<mode index>`.
fn plan(modes: &[String]) -> Vec<Job> {
    let modes: Vec<Vec<String>> = if modes.is_empty() {
        vec![Vec::new()]
    } else {
        modes
            .iter()
            .map(|m| m.split_whitespace().map(str::to_string).collect())
            .collect()
    };
    let mut jobs = Vec::new();
    for &scenario in dump_harness::scenario::all() {
        for (n, args) in modes.iter().enumerate() {
            jobs.push(Job {
                scenario,
                test_id: format!("{}-{n}", scenario.name),
                args: args.clone(),
            });
        }
    }
    jobs
}

fn execute(
    job: &Job,
    config: &HarnessConfig,
    keep: bool,
) -> std::result::Result<RunReport, HarnessError> {
    let ctx = RunContext::new(&job.test_id, config)?;
    let runner = SystemRunner::with_timeout(config.timeout());
    let report = dump_harness::run(&ctx, job.scenario, &job.args, &runner)?;
    if report.outcome().is_pass() && !keep {
        ctx.clean()?;
    }
    Ok(report)
}

pub fn run(args: &SuiteArgs, cli: &Cli) -> Result<i32> {
    let config = load_config(cli)?;
    let jobs = plan(&args.modes);
    tracing::debug!(runs = jobs.len(), jobs = ?args.jobs, "suite planned");

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(n) = args.jobs {
        pool = pool.num_threads(n.max(1));
    }
    let pool = pool.build()?;
    let results: Vec<_> = pool.install(|| {
        jobs.par_iter()
            .map(|job| execute(job, &config, args.keep))
            .collect()
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut code = 0;
    for (job, result) in jobs.iter().zip(&results) {
        match result {
            Ok(report) => {
                write_status(&mut out, report)?;
                code = code.max(exit_code(report));
            }
            Err(e) => {
                let kind = e.kind().map(|k| k.to_string()).unwrap_or_else(|| "error".into());
                writeln!(out, "ERROR {} ({}): {kind}: {e}", job.test_id, job.scenario.name)?;
                code = EXIT_ERROR;
            }
        }
    }

    let passed = results
        .iter()
        .filter(|r| matches!(r, Ok(report) if report.outcome().is_pass()))
        .count();
    writeln!(out, "{passed}/{} runs passed", results.len())?;
    Ok(code)
}
