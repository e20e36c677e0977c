use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use bstr::ByteSlice;

use crate::error::UtilError;
use crate::log::LogSink;
use crate::Result;

/// Number of trailing stderr lines carried in a `CommandFailed` error.
const STDERR_TAIL_LINES: usize = 8;

/// Result of running a subprocess.
#[derive(Debug)]
pub struct CommandOutput {
    /// The exit status.
    pub status: ExitStatus,
    /// Captured stdout (empty when redirected to a file).
    pub stdout: Vec<u8>,
    /// Captured stderr.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Returns true if the process exited successfully.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Human-readable exit status, e.g. `exit status: 1`.
    pub fn status_string(&self) -> String {
        self.status.to_string()
    }

    /// The last few lines of stderr, lossily decoded.
    pub fn stderr_tail(&self) -> String {
        let text = self.stderr.to_str_lossy();
        let lines: Vec<&str> = text.lines().collect();
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        lines[start..].join("\n")
    }
}

/// Description of one external process invocation.
///
/// Every invocation carries an explicit working directory; nothing in the
/// harness changes the process-wide current directory, which is what lets
/// independent runs proceed in parallel.
#[derive(Debug, Clone)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    env_vars: Vec<(OsString, OsString)>,
    working_dir: Option<PathBuf>,
    stdin_file: Option<PathBuf>,
    stdout_file: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl Invocation {
    /// Create a new invocation of the given program.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            env_vars: Vec::new(),
            working_dir: None,
            stdin_file: None,
            stdout_file: None,
            timeout: None,
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl AsRef<OsStr>>) -> Self {
        for arg in args {
            self.args.push(arg.as_ref().to_os_string());
        }
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<OsStr>, val: impl AsRef<OsStr>) -> Self {
        self.env_vars
            .push((key.as_ref().to_os_string(), val.as_ref().to_os_string()));
        self
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Feed stdin from a file.
    pub fn stdin_file(mut self, path: impl AsRef<Path>) -> Self {
        self.stdin_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Redirect stdout into a file (created or truncated).
    pub fn stdout_file(mut self, path: impl AsRef<Path>) -> Self {
        self.stdout_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set a timeout for the command.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    pub fn dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn stdout_target(&self) -> Option<&Path> {
        self.stdout_file.as_deref()
    }

    /// Get the command string for logs and error messages.
    pub fn command_string(&self) -> String {
        let mut s = self.program.to_string_lossy().to_string();
        for arg in &self.args {
            s.push(' ');
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                s.push('"');
                s.push_str(&arg);
                s.push('"');
            } else {
                s.push_str(&arg);
            }
        }
        if let Some(ref path) = self.stdin_file {
            s.push_str(&format!(" < {}", path.display()));
        }
        if let Some(ref path) = self.stdout_file {
            s.push_str(&format!(" > {}", path.display()));
        }
        s
    }

    /// Build the underlying `std::process::Command`.
    fn build_command(&self) -> Result<Command> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (key, val) in &self.env_vars {
            cmd.env(key, val);
        }
        match self.stdin_file {
            Some(ref path) => {
                cmd.stdin(Stdio::from(File::open(path)?));
            }
            None => {
                cmd.stdin(Stdio::null());
            }
        }
        match self.stdout_file {
            Some(ref path) => {
                cmd.stdout(Stdio::from(File::create(path)?));
            }
            None => {
                cmd.stdout(Stdio::piped());
            }
        }
        cmd.stderr(Stdio::piped());
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }
        Ok(cmd)
    }

    /// Run the command and wait for it to complete, capturing output.
    ///
    /// A non-zero exit is not an error here; see [`ProcessRunner`] for the
    /// fail-fast policy.
    pub fn run(&self) -> Result<CommandOutput> {
        let mut cmd = self.build_command()?;
        let cmd_str = self.command_string();

        let child = cmd.spawn().map_err(|e| UtilError::Subprocess {
            command: cmd_str.clone(),
            source: e,
        })?;

        match self.timeout {
            Some(timeout) => wait_with_timeout(child, timeout, cmd_str),
            None => {
                let output = child.wait_with_output().map_err(|e| UtilError::Subprocess {
                    command: cmd_str,
                    source: e,
                })?;
                Ok(CommandOutput {
                    status: output.status,
                    stdout: output.stdout,
                    stderr: output.stderr,
                })
            }
        }
    }
}

/// Poll the child until it exits or `timeout` elapses.
///
/// Pipes are drained on helper threads so a chatty child cannot block on a
/// full pipe while we poll.
fn wait_with_timeout(mut child: Child, timeout: Duration, cmd_str: String) -> Result<CommandOutput> {
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(UtilError::SubprocessTimeout {
                        command: cmd_str,
                        secs: timeout.as_secs(),
                    });
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(e) => {
                return Err(UtilError::Subprocess {
                    command: cmd_str,
                    source: e,
                })
            }
        }
    };

    Ok(CommandOutput {
        status,
        stdout: stdout.map(join_drain).unwrap_or_default(),
        stderr: stderr.map(join_drain).unwrap_or_default(),
    })
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn join_drain(handle: thread::JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}

/// Executes invocations on behalf of the harness.
///
/// Implementations record each invocation in the run's log sink and treat
/// a non-zero exit as `UtilError::CommandFailed`.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, invocation: &Invocation, log: &mut LogSink) -> Result<CommandOutput>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `timeout` to every invocation that does not set its own.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation, log: &mut LogSink) -> Result<CommandOutput> {
        let command = invocation.command_string();
        log.command(&command)?;
        tracing::debug!(%command, "running");

        let output = match (invocation.timeout, self.timeout) {
            (None, Some(timeout)) => invocation.clone().timeout(timeout).run(),
            _ => invocation.run(),
        };
        let output = match output {
            Ok(output) => output,
            Err(err) => {
                log.note(&format!("failed to run: {err}"))?;
                return Err(err);
            }
        };
        log.output(&output)?;

        if !output.success() {
            tracing::warn!(%command, status = %output.status, "command failed");
            return Err(UtilError::CommandFailed {
                command,
                status: output.status_string(),
                stderr: output.stderr_tail(),
                log: log.path().map(Path::to_path_buf),
            });
        }
        Ok(output)
    }
}
