use std::path::PathBuf;

/// Base error type for dump-utils operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    #[error("path error: {0}")]
    Path(String),

    #[error("subprocess failed: {command}: {source}")]
    Subprocess {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("subprocess timed out after {secs}s: {command}")]
    SubprocessTimeout { command: String, secs: u64 },

    /// The process ran but reported failure.
    #[error("`{command}` exited with {status}{}", stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        status: String,
        /// Last lines of the captured stderr.
        stderr: String,
        /// Run log holding the full transcript, when one is being written.
        log: Option<PathBuf>,
    },

    #[error("log sink error at {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl UtilError {
    /// The command line that failed, if this error came from a subprocess.
    pub fn command(&self) -> Option<&str> {
        match self {
            UtilError::Subprocess { command, .. }
            | UtilError::SubprocessTimeout { command, .. }
            | UtilError::CommandFailed { command, .. } => Some(command),
            _ => None,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_display_includes_stderr() {
        let err = UtilError::CommandFailed {
            command: "svn add dir1".into(),
            status: "exit status: 1".into(),
            stderr: "svn: E155007: not a working copy".into(),
            log: None,
        };
        assert_eq!(
            err.to_string(),
            "`svn add dir1` exited with exit status: 1: svn: E155007: not a working copy"
        );
        assert_eq!(err.command(), Some("svn add dir1"));
    }

    #[test]
    fn command_failed_display_without_stderr() {
        let err = UtilError::CommandFailed {
            command: "false".into(),
            status: "exit status: 1".into(),
            stderr: String::new(),
            log: None,
        };
        assert_eq!(err.to_string(), "`false` exited with exit status: 1");
    }

    #[test]
    fn path_error_has_no_command() {
        assert!(UtilError::Path("x".into()).command().is_none());
    }
}
