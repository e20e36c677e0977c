//! Differential testing harness for Subversion dump tools.
//!
//! A run replays a [`Scenario`] into a fresh repository, dumps it with the
//! reference dumper (`svnadmin dump`) and with a candidate dumper, loads the
//! candidate dump into a second, empty repository, re-dumps that with the
//! reference dumper and compares the two reference dumps.
//!
//! ```text
//! NotStarted → Bootstrapped → Dumped → Reloaded → Compared → Pass | Fail(kind)
//! ```
//!
//! Every component takes an explicit [`RunContext`]; runs with distinct test
//! ids share nothing and may execute in parallel.

pub mod bootstrap;
pub mod config;
pub mod context;
pub mod dump;
pub mod error;
pub mod reload;
pub mod run;
pub mod scenario;
pub mod svn;
pub mod verify;

#[cfg(test)]
pub(crate) mod test_support;

pub use bootstrap::{setup, WorkingRepository};
pub use config::HarnessConfig;
pub use context::{ArtifactRole, DumpArtifact, RunContext, TestId};
pub use dump::{dump_candidate, dump_reference};
pub use error::{FailKind, HarnessError};
pub use reload::reload;
pub use run::{run, Outcome, RunReport, RunStage, RunState};
pub use scenario::{Mutation, Scenario, Step, StepOutcome, StepSlot};
pub use verify::diff;

pub type Result<T> = std::result::Result<T, HarnessError>;
