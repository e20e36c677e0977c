//! Reference and candidate dumps of the finished source repository.

use dump_utils::{file_url, Invocation, LogSink, ProcessRunner};

use crate::context::{ArtifactRole, DumpArtifact, RunContext};
use crate::error::HarnessError;
use crate::svn::pin_env;
use crate::Result;

/// `svnadmin dump -q <repos>` into the reference artifact.
pub fn dump_reference(
    ctx: &RunContext,
    runner: &dyn ProcessRunner,
    log: &mut LogSink,
) -> Result<DumpArtifact> {
    let artifact = ctx.artifact(ArtifactRole::Reference);
    let invocation = ctx
        .tools()
        .svnadmin("dump")
        .arg("-q")
        .arg(ctx.repos_dir())
        .stdout_file(&artifact.path);
    produce(invocation, artifact, runner, log)
}

/// The candidate program with its configured base arguments, then `args`,
/// then the `file://` URL of the source repository.
pub fn dump_candidate(
    ctx: &RunContext,
    args: &[String],
    runner: &dyn ProcessRunner,
    log: &mut LogSink,
) -> Result<DumpArtifact> {
    let artifact = ctx.artifact(ArtifactRole::Candidate);
    let url = file_url(&ctx.repos_dir()).map_err(|source| HarnessError::Dump {
        role: ArtifactRole::Candidate,
        source,
    })?;
    let candidate = &ctx.config().candidate;
    let invocation = pin_env(Invocation::new(&candidate.program))
        .args(&candidate.args)
        .args(args)
        .arg(url)
        .working_dir(ctx.work_root())
        .stdout_file(&artifact.path);
    produce(invocation, artifact, runner, log)
}

fn produce(
    invocation: Invocation,
    artifact: DumpArtifact,
    runner: &dyn ProcessRunner,
    log: &mut LogSink,
) -> Result<DumpArtifact> {
    let role = artifact.role;
    runner
        .run(&invocation, log)
        .map_err(|source| HarnessError::Dump { role, source })?;
    if artifact.is_empty() {
        tracing::warn!(%role, path = %artifact.path.display(), "empty dump");
        return Err(HarnessError::EmptyDump {
            role,
            path: artifact.path,
        });
    }
    tracing::debug!(%role, bytes = artifact.len(), "dumped");
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::error::FailKind;
    use crate::test_support::RecordingRunner;

    fn context(root: &std::path::Path) -> RunContext {
        let mut config = HarnessConfig {
            work_root: root.to_path_buf(),
            ..HarnessConfig::default()
        };
        config.candidate.program = "rsvndump".into();
        config.candidate.args = vec!["--keep-revnums".into()];
        let ctx = RunContext::new("dump", &config).unwrap();
        ctx.reset().unwrap();
        ctx
    }

    #[test]
    fn candidate_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let runner = RecordingRunner::new();
        let mut log = LogSink::memory();

        let artifact =
            dump_candidate(&ctx, &["--incremental".to_string()], &runner, &mut log).unwrap();
        assert_eq!(artifact.role, ArtifactRole::Candidate);
        assert!(!artifact.is_empty());

        let url = file_url(&ctx.repos_dir()).unwrap();
        assert_eq!(
            runner.commands(),
            vec![format!("rsvndump --keep-revnums --incremental {url}")]
        );
    }

    #[test]
    fn reference_dump_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let runner = RecordingRunner::new();
        let mut log = LogSink::memory();
        let artifact = dump_reference(&ctx, &runner, &mut log).unwrap();
        assert_eq!(artifact.path, ctx.artifact(ArtifactRole::Reference).path);
        assert_eq!(
            runner.commands(),
            vec![format!("svnadmin dump -q {}", ctx.repos_dir().display())]
        );
    }

    #[test]
    fn empty_output_is_a_dump_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let runner = RecordingRunner::new().with_stdout(b"");
        let mut log = LogSink::memory();
        let err = dump_candidate(&ctx, &[], &runner, &mut log).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::EmptyDump {
                role: ArtifactRole::Candidate,
                ..
            }
        ));
        assert_eq!(err.kind(), Some(FailKind::Dump));
    }

    #[test]
    fn failing_candidate_is_a_dump_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let runner = RecordingRunner::failing_on("rsvndump");
        let mut log = LogSink::memory();
        let err = dump_candidate(&ctx, &[], &runner, &mut log).unwrap_err();
        assert!(matches!(err, HarnessError::Dump { .. }));
        assert_eq!(err.kind(), Some(FailKind::Dump));
    }
}
