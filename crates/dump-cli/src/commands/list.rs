use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use dump_harness::scenario;

#[derive(Args)]
pub struct ListArgs {
    /// Print only the scenario names
    #[arg(short, long)]
    quiet: bool,
}

pub fn run(args: &ListArgs) -> Result<i32> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for scenario in scenario::all() {
        if args.quiet {
            writeln!(out, "{}", scenario.name)?;
        } else {
            writeln!(
                out,
                "{:<10} {:>2} steps  {}",
                scenario.name,
                scenario.active_steps(),
                scenario.info
            )?;
        }
    }
    Ok(0)
}
