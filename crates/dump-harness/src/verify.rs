//! Compare the reference dump with the reloaded candidate dump.

use std::fs;

use dump_diff::format::unified;
use dump_diff::{compare_files, ComparisonResult};
use dump_utils::LogSink;

use crate::context::{DumpArtifact, RunContext};
use crate::error::HarnessError;
use crate::Result;

/// Normalize and compare two artifacts.
///
/// A divergence is a successful result. Its unified rendering is written to
/// the run's `.diff` file and appended to the log.
pub fn diff(
    ctx: &RunContext,
    reference: &DumpArtifact,
    reloaded: &DumpArtifact,
    log: &mut LogSink,
) -> Result<ComparisonResult> {
    let result = compare_files(
        &reference.path,
        &reloaded.path,
        ctx.normalizer(),
        &ctx.compare_options(),
    )?;

    if !result.is_equivalent() {
        let text = unified::format(&result, &label(reference), &label(reloaded));
        let diff_path = ctx.diff_path();
        fs::write(&diff_path, &text).map_err(HarnessError::io(&diff_path))?;
        log.note(&format!("dumps diverge: {}", result.summary()))
            .map_err(HarnessError::Log)?;
        log.attach("diff", text.as_bytes())
            .map_err(HarnessError::Log)?;
        tracing::warn!(test_id = %ctx.test_id(), summary = %result.summary(), "dumps diverge");
    }
    Ok(result)
}

fn label(artifact: &DumpArtifact) -> String {
    match artifact.path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => artifact.role.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::context::ArtifactRole;
    use crate::error::FailKind;

    const REFERENCE: &[u8] = b"SVN-fs-dump-format-version: 2\n\nUUID: 1e7d-aaaa\n\nRevision-number: 0\n";
    const RELOADED: &[u8] = b"SVN-fs-dump-format-version: 2\n\nUUID: 99ff-bbbb\n\nRevision-number: 0\n";

    fn context(root: &std::path::Path) -> RunContext {
        let config = HarnessConfig {
            work_root: root.to_path_buf(),
            ..HarnessConfig::default()
        };
        let ctx = RunContext::new("verify", &config).unwrap();
        ctx.reset().unwrap();
        ctx
    }

    fn write(ctx: &RunContext, role: ArtifactRole, data: &[u8]) -> DumpArtifact {
        let artifact = ctx.artifact(role);
        fs::write(&artifact.path, data).unwrap();
        artifact
    }

    #[test]
    fn uuid_difference_is_equivalent() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let reference = write(&ctx, ArtifactRole::Reference, REFERENCE);
        let reloaded = write(&ctx, ArtifactRole::Reloaded, RELOADED);
        let mut log = LogSink::memory();

        let result = diff(&ctx, &reference, &reloaded, &mut log).unwrap();
        assert!(result.is_equivalent());
        assert!(!ctx.diff_path().exists());
    }

    #[test]
    fn divergence_writes_diff_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let reference = write(&ctx, ArtifactRole::Reference, REFERENCE);
        let mut changed = RELOADED.to_vec();
        changed.extend_from_slice(b"Prop-content-length: 10\n");
        let reloaded = write(&ctx, ArtifactRole::Reloaded, &changed);
        let mut log = LogSink::memory();

        let result = diff(&ctx, &reference, &reloaded, &mut log).unwrap();
        assert_eq!(result.insertions(), 1);
        assert_eq!(result.deletions(), 0);

        let text = fs::read_to_string(ctx.diff_path()).unwrap();
        assert!(text.starts_with("--- verify.reference.dump\n+++ verify.reloaded.dump\n"));
        assert!(text.contains("+Prop-content-length: 10\n"));
        assert!(log.contents().unwrap().contains("[diff]\n--- verify.reference.dump"));
    }

    #[test]
    fn missing_artifact_is_compare_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let reference = write(&ctx, ArtifactRole::Reference, REFERENCE);
        let mut log = LogSink::memory();
        let err = diff(&ctx, &reference, &ctx.artifact(ArtifactRole::Reloaded), &mut log)
            .unwrap_err();
        assert!(matches!(err, HarnessError::Compare(_)));
        assert_eq!(err.kind(), Some(FailKind::Dump));
    }
}
