use std::path::{Path, PathBuf};

use dump_diff::DiffError;
use dump_utils::UtilError;

use crate::context::ArtifactRole;
use crate::run::RunStage;

/// Which stage of a run failed.
///
/// `Mismatch` is never produced by a [`HarnessError`]: a divergence is the
/// designed output of a completed run and is reported through
/// [`crate::RunReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailKind {
    Bootstrap,
    Dump,
    Reload,
    Mismatch,
}

impl std::fmt::Display for FailKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FailKind::Bootstrap => "bootstrap error",
            FailKind::Dump => "dump error",
            FailKind::Reload => "reload error",
            FailKind::Mismatch => "mismatch",
        })
    }
}

/// Error type for harness operations.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("bootstrap failed{}: {source}", step_suffix(.step))]
    Bootstrap {
        /// Scenario step being applied, `None` while creating the repository.
        step: Option<usize>,
        #[source]
        source: UtilError,
    },

    #[error("{role} dump failed: {source}")]
    Dump {
        role: ArtifactRole,
        #[source]
        source: UtilError,
    },

    #[error("{role} dump produced no output: {}", .path.display())]
    EmptyDump { role: ArtifactRole, path: PathBuf },

    #[error("reload failed: {source}")]
    Reload {
        #[source]
        source: UtilError,
    },

    #[error("cannot write run log: {0}")]
    Log(#[source] UtilError),

    #[error("comparison failed: {0}")]
    Compare(#[from] DiffError),

    #[error("invalid configuration: {details}")]
    Config { details: String },

    #[error("cannot parse configuration {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid test id '{0}': use letters, digits, '.', '_' or '-'")]
    InvalidTestId(String),

    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("illegal stage transition {from:?} -> {to:?}")]
    Stage { from: RunStage, to: RunStage },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    /// The run failure this error represents, or `None` for errors raised
    /// before a run starts (configuration, bad ids, misuse).
    pub fn kind(&self) -> Option<FailKind> {
        match self {
            HarnessError::Bootstrap { .. } => Some(FailKind::Bootstrap),
            HarnessError::Dump { .. } | HarnessError::EmptyDump { .. } => Some(FailKind::Dump),
            // An unreadable artifact means the stage that should have written it failed
            HarnessError::Compare(_) => Some(FailKind::Dump),
            HarnessError::Reload { .. } => Some(FailKind::Reload),
            _ => None,
        }
    }

    /// The command line that failed, if any.
    pub fn command(&self) -> Option<&str> {
        self.util_source().and_then(UtilError::command)
    }

    /// Run log holding the full transcript of the failing command.
    pub fn log_path(&self) -> Option<&Path> {
        match self.util_source() {
            Some(UtilError::CommandFailed { log, .. }) => log.as_deref(),
            _ => None,
        }
    }

    fn util_source(&self) -> Option<&UtilError> {
        match self {
            HarnessError::Bootstrap { source, .. }
            | HarnessError::Dump { source, .. }
            | HarnessError::Reload { source } => Some(source),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl AsRef<Path>) -> impl FnOnce(std::io::Error) -> HarnessError {
        let path = path.as_ref().to_path_buf();
        move |source| HarnessError::Io { path, source }
    }
}

fn step_suffix(step: &Option<usize>) -> String {
    match step {
        Some(step) => format!(" at step {step}"),
        None => String::new(),
    }
}
