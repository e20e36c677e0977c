//! A `ProcessRunner` that records instead of executing.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Mutex;

use dump_utils::{CommandOutput, Invocation, LogSink, ProcessRunner, UtilError};

#[derive(Default)]
pub(crate) struct RecordingRunner {
    commands: Mutex<Vec<String>>,
    fail_prefix: Option<String>,
    create_dirs: Vec<(String, PathBuf)>,
    stdout: Vec<u8>,
    stdout_for: Vec<(PathBuf, Vec<u8>)>,
}

impl RecordingRunner {
    pub(crate) fn new() -> Self {
        Self {
            stdout: b"SVN-fs-dump-format-version: 2\n".to_vec(),
            ..Self::default()
        }
    }

    /// Fail every command whose command line starts with `prefix`.
    pub(crate) fn failing_on(prefix: &str) -> Self {
        Self {
            fail_prefix: Some(prefix.to_string()),
            ..Self::new()
        }
    }

    /// Create `dir` when a command starting with `prefix` runs.
    pub(crate) fn creating_dir_on(mut self, prefix: &str, dir: PathBuf) -> Self {
        self.create_dirs.push((prefix.to_string(), dir));
        self
    }

    /// Bytes written to every redirected stdout.
    pub(crate) fn with_stdout(mut self, stdout: &[u8]) -> Self {
        self.stdout = stdout.to_vec();
        self
    }

    /// Bytes written instead when stdout is redirected to `target`.
    pub(crate) fn with_stdout_for(mut self, target: PathBuf, stdout: &[u8]) -> Self {
        self.stdout_for.push((target, stdout.to_vec()));
        self
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation, log: &mut LogSink) -> dump_utils::Result<CommandOutput> {
        // redirections are not part of the recorded line
        let command = Invocation::new(invocation.program())
            .args(invocation.arguments())
            .command_string();
        log.command(&command)?;
        self.commands.lock().unwrap().push(command.clone());

        if self
            .fail_prefix
            .as_deref()
            .is_some_and(|prefix| command.starts_with(prefix))
        {
            return Err(UtilError::CommandFailed {
                command,
                status: "exit status: 1".into(),
                stderr: "svn: E000000: simulated failure".into(),
                log: log.path().map(Path::to_path_buf),
            });
        }
        for (prefix, dir) in &self.create_dirs {
            if command.starts_with(prefix.as_str()) {
                fs::create_dir_all(dir)?;
            }
        }
        if let Some(target) = invocation.stdout_target() {
            let stdout = self
                .stdout_for
                .iter()
                .find(|(path, _)| path.as_path() == target)
                .map_or(self.stdout.as_slice(), |(_, bytes)| bytes.as_slice());
            fs::write(target, stdout)?;
        }
        Ok(CommandOutput {
            status: success(),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}

fn success() -> ExitStatus {
    #[cfg(unix)]
    {
        std::os::unix::process::ExitStatusExt::from_raw(0)
    }
    #[cfg(windows)]
    {
        std::os::windows::process::ExitStatusExt::from_raw(0)
    }
}
