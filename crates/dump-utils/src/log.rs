//! Per-run transcript of every external invocation.
//!
//! Each harness run owns one `LogSink`. Every command line is written as a
//! `$ program args...` line followed by the command's captured stdout and
//! stderr, so a failed run can be diagnosed without rerunning it.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use bstr::ByteSlice;

use crate::error::UtilError;
use crate::subprocess::CommandOutput;
use crate::Result;

enum Target {
    File { path: PathBuf, file: File },
    Memory(Vec<u8>),
}

/// Append-only transcript for one run.
pub struct LogSink {
    target: Target,
}

impl LogSink {
    /// Create (truncating) the log file at `path`, creating parent directories.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| UtilError::Log {
                path: path.clone(),
                source,
            })?;
        }
        let file = File::create(&path).map_err(|source| UtilError::Log {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            target: Target::File { path, file },
        })
    }

    /// A sink that keeps the transcript in memory.
    pub fn memory() -> Self {
        Self {
            target: Target::Memory(Vec::new()),
        }
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            Target::File { path, .. } => Some(path),
            Target::Memory(_) => None,
        }
    }

    /// Write a timestamped free-form note.
    pub fn note(&mut self, message: &str) -> Result<()> {
        let stamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        self.write_all(format!("# [{stamp}] {message}\n").as_bytes())
    }

    /// Record a command line about to be executed.
    pub fn command(&mut self, command_line: &str) -> Result<()> {
        self.write_all(format!("$ {command_line}\n").as_bytes())
    }

    /// Record the captured output of a finished command.
    pub fn output(&mut self, output: &CommandOutput) -> Result<()> {
        if !output.stdout.is_empty() {
            self.write_block(&output.stdout)?;
        }
        if !output.stderr.is_empty() {
            self.write_all(b"[stderr]\n")?;
            self.write_block(&output.stderr)?;
        }
        if !output.success() {
            self.write_all(format!("[{}]\n", output.status_string()).as_bytes())?;
        }
        Ok(())
    }

    /// Append a titled verbatim block, such as a rendered diff.
    pub fn attach(&mut self, title: &str, data: &[u8]) -> Result<()> {
        self.write_all(format!("[{title}]\n").as_bytes())?;
        self.write_block(data)
    }

    /// Return the whole transcript as text.
    pub fn contents(&self) -> Result<String> {
        match &self.target {
            Target::File { path, .. } => {
                let bytes = fs::read(path).map_err(|source| UtilError::Log {
                    path: path.clone(),
                    source,
                })?;
                Ok(bytes.to_str_lossy().into_owned())
            }
            Target::Memory(buf) => Ok(buf.to_str_lossy().into_owned()),
        }
    }

    fn write_block(&mut self, data: &[u8]) -> Result<()> {
        self.write_all(data)?;
        if !data.ends_with(b"\n") {
            self.write_all(b"\n")?;
        }
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match &mut self.target {
            Target::File { path, file } => file.write_all(data).map_err(|source| UtilError::Log {
                path: path.clone(),
                source,
            }),
            Target::Memory(buf) => {
                buf.extend_from_slice(data);
                Ok(())
            }
        }
    }
}
