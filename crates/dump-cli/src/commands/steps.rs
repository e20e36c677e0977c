use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use dump_harness::StepSlot;

#[derive(Args)]
pub struct StepsArgs {
    /// Scenario name
    scenario: String,

    /// Print only the step summaries
    #[arg(short, long)]
    brief: bool,
}

pub fn run(args: &StepsArgs) -> Result<i32> {
    let scenario = super::lookup(&args.scenario)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (index, slot) in scenario.slots.iter().enumerate() {
        let state = match slot {
            StepSlot::Active(_) => "active",
            StepSlot::Retired(_) => "retired",
        };
        let step = slot.step();
        writeln!(out, "{index:>3}  {state:<7}  {}", step.summary)?;
        if !args.brief {
            for mutation in step.mutations {
                writeln!(out, "                {mutation}")?;
            }
        }
    }
    Ok(0)
}
