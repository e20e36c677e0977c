//! Shared helpers for dumpcheck integration tests.
//!
//! Every invocation runs with a pinned environment and its own work root so
//! tests never see a developer's `dumpcheck.toml` or `DUMPCHECK_*` settings.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ──────────────────────────── Types ────────────────────────────

/// Captured output from running a command.
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

// ──────────────────────────── Binary Discovery ────────────────────────────

pub fn dumpcheck_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dumpcheck"))
}

// ──────────────────────────── Process Runners ────────────────────────────

fn pin_env(cmd: &mut Command, dir: &Path) {
    cmd.env("TZ", "UTC")
        .env("LC_ALL", "C")
        .env("LANG", "C")
        .env("HOME", dir)
        .env("DUMPCHECK_WORK_ROOT", dir.join("work"))
        .env_remove("DUMPCHECK_SVN")
        .env_remove("DUMPCHECK_SVNADMIN")
        .env_remove("DUMPCHECK_CANDIDATE")
        .env_remove("DUMPCHECK_LOG");
}

/// Run dumpcheck in `dir` with the given arguments.
pub fn dumpcheck(dir: &Path, args: &[&str]) -> CommandResult {
    let mut cmd = Command::new(dumpcheck_bin());
    cmd.args(args)
        .current_dir(dir)
        .stdin(Stdio::null());
    pin_env(&mut cmd, dir);
    let output = cmd.output().expect("failed to run dumpcheck");
    CommandResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(128),
    }
}

// ──────────────────────────── Subversion ────────────────────────────

/// True when both Subversion tools can be executed.
pub fn svn_available() -> bool {
    let found = ["svn", "svnadmin"].iter().all(|tool| {
        Command::new(tool)
            .arg("--version")
            .arg("--quiet")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    });
    if !found {
        eprintln!("svn/svnadmin not found, skipping");
    }
    found
}

/// Write `dumpcheck.toml` in `dir` with a `sh` candidate running `script`;
/// the repository URL is the script's last argument.
pub fn write_config(dir: &Path, script: &str) {
    let toml = format!(
        "[candidate]\nprogram = \"sh\"\nargs = [\"-c\", '{script}', \"candidate\"]\n"
    );
    std::fs::write(dir.join("dumpcheck.toml"), toml).unwrap();
}

pub const MIRROR_CANDIDATE: &str =
    r#"for url; do :; done; exec svnadmin dump -q "${url#file://}""#;

pub const TRUNCATING_CANDIDATE: &str =
    r#"for url; do :; done; exec svnadmin dump -q -r 0:5 "${url#file://}""#;

// ──────────────────────────── Assertion Helpers ────────────────────────────

/// Assert the exit code, showing both streams on failure.
pub fn assert_exit(result: &CommandResult, expected: i32) {
    assert_eq!(
        result.exit_code, expected,
        "exit code mismatch\nstdout:\n{}\nstderr:\n{}",
        result.stdout, result.stderr
    );
}
