//! One complete differential run.
//!
//! A run moves through its stages strictly in order:
//!
//! ```text
//! NotStarted -> Bootstrapped -> Dumped -> Reloaded -> Compared -> Pass
//!      \              \            \           \
//!       +--------------+------------+-----------+---------------> Fail(kind)
//! ```
//!
//! A stage may only advance to its direct successor. The first failing
//! stage ends the run with the matching [`FailKind`]; a completed comparison
//! ends it with `Pass` or `Fail(Mismatch)`.

use std::path::PathBuf;

use dump_diff::ComparisonResult;
use dump_utils::{LogSink, ProcessRunner};

use crate::bootstrap::setup;
use crate::context::{DumpArtifact, RunContext, TestId};
use crate::dump::{dump_candidate, dump_reference};
use crate::error::{FailKind, HarnessError};
use crate::reload::reload;
use crate::scenario::Scenario;
use crate::verify::diff;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunStage {
    NotStarted,
    Bootstrapped,
    Dumped,
    Reloaded,
    Compared,
}

impl RunStage {
    pub fn next(self) -> Option<RunStage> {
        match self {
            RunStage::NotStarted => Some(RunStage::Bootstrapped),
            RunStage::Bootstrapped => Some(RunStage::Dumped),
            RunStage::Dumped => Some(RunStage::Reloaded),
            RunStage::Reloaded => Some(RunStage::Compared),
            RunStage::Compared => None,
        }
    }

    /// The failure a problem in the stage following this one maps to.
    fn failure(self) -> FailKind {
        match self {
            RunStage::NotStarted => FailKind::Bootstrap,
            RunStage::Bootstrapped => FailKind::Dump,
            RunStage::Dumped => FailKind::Reload,
            RunStage::Reloaded | RunStage::Compared => FailKind::Dump,
        }
    }
}

/// Final verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(FailKind),
}

impl Outcome {
    pub fn is_pass(self) -> bool {
        self == Outcome::Pass
    }
}

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running(RunStage),
    Finished(Outcome),
}

impl Default for RunState {
    fn default() -> Self {
        RunState::Running(RunStage::NotStarted)
    }
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(self) -> Option<RunStage> {
        match self {
            RunState::Running(stage) => Some(stage),
            RunState::Finished(_) => None,
        }
    }

    /// Move to `to`, which must directly follow the current stage.
    pub fn advance(&mut self, to: RunStage) -> Result<()> {
        match *self {
            RunState::Running(from) if from.next() == Some(to) => {
                *self = RunState::Running(to);
                Ok(())
            }
            RunState::Running(from) => Err(HarnessError::Stage { from, to }),
            RunState::Finished(_) => Err(HarnessError::Stage {
                from: RunStage::Compared,
                to,
            }),
        }
    }

    /// End the run from any unfinished stage.
    pub fn fail(&mut self, kind: FailKind) {
        if let RunState::Running(_) = self {
            *self = RunState::Finished(Outcome::Fail(kind));
        }
    }

    /// End a run whose comparison has completed.
    pub fn conclude(&mut self, result: &ComparisonResult) -> Result<Outcome> {
        match *self {
            RunState::Running(RunStage::Compared) => {
                let outcome = if result.is_equivalent() {
                    Outcome::Pass
                } else {
                    Outcome::Fail(FailKind::Mismatch)
                };
                *self = RunState::Finished(outcome);
                Ok(outcome)
            }
            RunState::Running(from) => Err(HarnessError::Stage {
                from,
                to: RunStage::Compared,
            }),
            RunState::Finished(outcome) => Ok(outcome),
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub test_id: TestId,
    pub scenario: &'static str,
    /// `Pass` or `Fail(Mismatch)`; stage failures never produce a report.
    outcome: Outcome,
    /// Revisions committed while bootstrapping.
    pub revisions: usize,
    pub reference: DumpArtifact,
    pub candidate: DumpArtifact,
    pub reloaded: DumpArtifact,
    pub comparison: ComparisonResult,
    /// Unified diff, written only on mismatch.
    pub diff_path: Option<PathBuf>,
    pub log_path: PathBuf,
}

impl RunReport {
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn artifacts(&self) -> [&DumpArtifact; 3] {
        [&self.reference, &self.candidate, &self.reloaded]
    }
}

/// Bootstrap `scenario`, dump it with both dumpers, reload the candidate
/// dump and compare.
///
/// A mismatch is a successful run whose report says
/// `Fail(Mismatch)`. Any stage failure is returned as the error; its
/// [`HarnessError::kind`] names the stage.
pub fn run(
    ctx: &RunContext,
    scenario: &Scenario,
    candidate_args: &[String],
    runner: &dyn ProcessRunner,
) -> Result<RunReport> {
    let mut log = ctx.open_log()?;
    let mut state = RunState::new();
    tracing::info!(test_id = %ctx.test_id(), scenario = scenario.name, "run started");

    match drive(ctx, scenario, candidate_args, runner, &mut log, &mut state) {
        Ok(report) => {
            tracing::info!(
                test_id = %ctx.test_id(),
                outcome = ?report.outcome(),
                summary = %report.comparison.summary(),
                "run finished"
            );
            Ok(report)
        }
        Err(err) => {
            let kind = err
                .kind()
                .or_else(|| state.stage().map(RunStage::failure))
                .unwrap_or(FailKind::Bootstrap);
            state.fail(kind);
            tracing::warn!(test_id = %ctx.test_id(), %kind, error = %err, "run failed");
            // the original error matters more than a broken transcript
            let _ = log.note(&format!("{kind}: {err}"));
            Err(err)
        }
    }
}

fn drive(
    ctx: &RunContext,
    scenario: &Scenario,
    candidate_args: &[String],
    runner: &dyn ProcessRunner,
    log: &mut LogSink,
    state: &mut RunState,
) -> Result<RunReport> {
    let repository = setup(ctx, scenario, runner, log)?;
    state.advance(RunStage::Bootstrapped)?;

    let reference = dump_reference(ctx, runner, log)?;
    let candidate = dump_candidate(ctx, candidate_args, runner, log)?;
    state.advance(RunStage::Dumped)?;
    tracing::info!(test_id = %ctx.test_id(), "dumped");

    let reloaded = reload(ctx, &candidate, runner, log)?;
    state.advance(RunStage::Reloaded)?;

    let comparison = diff(ctx, &reference, &reloaded, log)?;
    state.advance(RunStage::Compared)?;
    let outcome = state.conclude(&comparison)?;
    log.note(&format!("{:?}: {}", outcome, comparison.summary()))
        .map_err(HarnessError::Log)?;

    Ok(RunReport {
        test_id: ctx.test_id().clone(),
        scenario: scenario.name,
        outcome,
        revisions: repository.revisions,
        reference,
        candidate,
        reloaded,
        diff_path: (!comparison.is_equivalent()).then(|| ctx.diff_path()),
        comparison,
        log_path: ctx.log_path(),
    })
}
