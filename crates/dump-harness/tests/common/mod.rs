//! Shared setup for harness integration tests.
//!
//! These tests drive the real `svn` and `svnadmin`. When the tools are not
//! on `PATH` every test returns early after printing a note.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Stdio};

use dump_harness::HarnessConfig;

/// A candidate that behaves exactly like the reference dumper.
pub const MIRROR_CANDIDATE: &str =
    r#"for url; do :; done; exec svnadmin dump -q "${url#file://}""#;

/// A candidate that silently drops every revision after 5.
pub const TRUNCATING_CANDIDATE: &str =
    r#"for url; do :; done; exec svnadmin dump -q -r 0:5 "${url#file://}""#;

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

/// Configuration rooted at `root` whose candidate runs `script` through `sh`.
///
/// The repository URL is the script's last argument; per-run arguments
/// before it are ignored.
pub fn config(root: &Path, script: &str) -> HarnessConfig {
    let mut config = HarnessConfig {
        work_root: root.to_path_buf(),
        ..HarnessConfig::default()
    };
    config.candidate.program = "sh".into();
    config.candidate.args = vec!["-c".into(), script.into(), "candidate".into()];
    config
}
