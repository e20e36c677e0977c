//! Load the candidate dump into a fresh repository and dump it again.

use std::fs;
use std::io;

use dump_utils::{LogSink, ProcessRunner, UtilError};

use crate::context::{ArtifactRole, DumpArtifact, RunContext};
use crate::error::HarnessError;
use crate::Result;

/// Re-create the verification repository, `svnadmin load -q` the candidate
/// artifact into it and dump the result with `svnadmin dump -q`.
///
/// If the reloaded dump matches the reference dump, the candidate encoded
/// the same history.
pub fn reload(
    ctx: &RunContext,
    candidate: &DumpArtifact,
    runner: &dyn ProcessRunner,
    log: &mut LogSink,
) -> Result<DumpArtifact> {
    let reload_err = |source| HarnessError::Reload { source };
    let vrepos = ctx.verify_repos_dir();
    match fs::remove_dir_all(&vrepos) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            return Err(reload_err(UtilError::Io(e)));
        }
        _ => {}
    }

    let tools = ctx.tools();
    runner
        .run(&tools.svnadmin("create").arg(&vrepos), log)
        .map_err(reload_err)?;
    runner
        .run(
            &tools
                .svnadmin("load")
                .arg("-q")
                .arg(&vrepos)
                .stdin_file(&candidate.path),
            log,
        )
        .map_err(reload_err)?;

    let reloaded = ctx.artifact(ArtifactRole::Reloaded);
    runner
        .run(
            &tools
                .svnadmin("dump")
                .arg("-q")
                .arg(&vrepos)
                .stdout_file(&reloaded.path),
            log,
        )
        .map_err(reload_err)?;
    tracing::debug!(test_id = %ctx.test_id(), bytes = reloaded.len(), "reloaded");
    Ok(reloaded)
}
