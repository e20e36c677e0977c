//! Build the source repository by replaying a scenario.

use std::path::PathBuf;

use dump_utils::{file_url, LogSink, ProcessRunner};

use crate::context::RunContext;
use crate::error::HarnessError;
use crate::scenario::{Scenario, StepOutcome};
use crate::Result;

/// A source repository with every scenario step committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingRepository {
    pub repos: PathBuf,
    pub wc: PathBuf,
    /// `file://` URL of `repos`.
    pub url: String,
    /// Applied steps, one revision each.
    pub revisions: usize,
    /// Retired slots passed over.
    pub retired: usize,
}

/// Create a fresh repository and working copy for `ctx` and replay every
/// step of `scenario`, committing after each applied step.
///
/// Anything a previous run with the same test id left behind is removed
/// first. On failure the partial repository stays on disk.
pub fn setup(
    ctx: &RunContext,
    scenario: &Scenario,
    runner: &dyn ProcessRunner,
    log: &mut LogSink,
) -> Result<WorkingRepository> {
    let before_steps = |source| HarnessError::Bootstrap { step: None, source };

    ctx.reset()?;
    let svn = ctx.tools();
    let repos = ctx.repos_dir();
    let wc = ctx.wc_dir();

    log.note(&format!(
        "bootstrap {} from scenario {}",
        ctx.test_id(),
        scenario.name
    ))
    .map_err(HarnessError::Log)?;
    runner
        .run(&svn.svnadmin("create").arg(&repos), log)
        .map_err(before_steps)?;
    let url = file_url(&repos).map_err(before_steps)?;
    runner
        .run(&svn.svn(&["checkout", &url], ctx.work_root()).arg(&wc), log)
        .map_err(before_steps)?;

    let mut revisions = 0;
    let mut retired = 0;
    let mut index = 0;
    loop {
        let at_step = move |source| HarnessError::Bootstrap {
            step: Some(index),
            source,
        };
        match scenario.step(index, &wc, &svn, runner, log).map_err(at_step)? {
            StepOutcome::Applied => {
                let message = format!("step {index}");
                runner
                    .run(&svn.svn(&["commit", "-m", &message], &wc), log)
                    .map_err(at_step)?;
                revisions += 1;
                tracing::debug!(test_id = %ctx.test_id(), step = index, "committed");
            }
            StepOutcome::Retired => {
                retired += 1;
                tracing::debug!(test_id = %ctx.test_id(), step = index, "retired step skipped");
            }
            StepOutcome::Done => break,
        }
        index += 1;
    }

    tracing::info!(
        test_id = %ctx.test_id(),
        scenario = scenario.name,
        revisions,
        "bootstrapped"
    );
    Ok(WorkingRepository {
        repos,
        wc,
        url,
        revisions,
        retired,
    })
}
