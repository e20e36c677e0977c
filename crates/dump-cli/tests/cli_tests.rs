mod common;

use common::*;

#[test]
fn list_shows_builtin_scenarios() {
    let dir = tempfile::tempdir().unwrap();
    let result = dumpcheck(dir.path(), &["list"]);
    assert_exit(&result, 0);
    let lines: Vec<_> = result.stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("props"));
    assert!(lines[0].contains(" 9 steps"));
    assert!(lines[1].starts_with("content"));

    let quiet = dumpcheck(dir.path(), &["list", "-q"]);
    assert_eq!(quiet.stdout, "props\ncontent\n");
}

#[test]
fn steps_marks_retired_slots() {
    let dir = tempfile::tempdir().unwrap();
    let result = dumpcheck(dir.path(), &["steps", "props", "--brief"]);
    assert_exit(&result, 0);
    let lines: Vec<_> = result.stdout.lines().collect();
    assert_eq!(lines.len(), 12);
    assert!(lines[0].starts_with("  0  active "));
    assert!(lines[8].starts_with("  8  active "));
    assert!(lines[9].starts_with("  9  retired"));
    assert!(lines[11].starts_with(" 11  retired"));
}

#[test]
fn steps_prints_mutations() {
    let dir = tempfile::tempdir().unwrap();
    let result = dumpcheck(dir.path(), &["steps", "props"]);
    assert_exit(&result, 0);
    assert!(result.stdout.contains("mkdir dir1\n"));
    assert!(result.stdout.contains("write dir1/file1 \"hello1\\n\"\n"));
    assert!(result
        .stdout
        .contains("svn propset license \"public domain\" dir1/file1\n"));
    assert!(result.stdout.contains("svn cp dir3 dir4\n"));
}

#[test]
fn unknown_scenario_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = dumpcheck(dir.path(), &["steps", "nope"]);
    assert_exit(&result, 128);
    assert_eq!(result.stderr, "fatal: unknown scenario 'nope'\n");
}

#[test]
fn bad_usage_exits_128() {
    let dir = tempfile::tempdir().unwrap();
    let result = dumpcheck(dir.path(), &["frobnicate"]);
    assert_exit(&result, 128);
}

#[test]
fn broken_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("dumpcheck.toml"), "timeout_secs = \"x\"\n").unwrap();
    let result = dumpcheck(dir.path(), &["run"]);
    assert_exit(&result, 128);
    assert!(result.stderr.starts_with("fatal: cannot parse configuration"));
}

#[test]
fn run_passes_with_mirror_candidate() {
    if !svn_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), MIRROR_CANDIDATE);

    let result = dumpcheck(dir.path(), &["run", "props"]);
    assert_exit(&result, 0);
    assert_eq!(result.stdout, "PASS props (props, 9 revisions)\n");

    let work = dir.path().join("work");
    assert!(work.join("dumps/props.reference.dump").is_file());
    assert!(work.join("logs/props.log").is_file());
    assert!(!work.join("repos/props").exists(), "passing run not cleaned");
}

#[test]
fn keep_leaves_repositories() {
    if !svn_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), MIRROR_CANDIDATE);

    let result = dumpcheck(dir.path(), &["run", "content", "--id", "kept", "--keep"]);
    assert_exit(&result, 0);
    assert!(dir.path().join("work/repos/kept").is_dir());
    assert!(dir.path().join("work/wc/kept").is_dir());
}

#[test]
fn run_reports_mismatch() {
    if !svn_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), TRUNCATING_CANDIDATE);

    let result = dumpcheck(dir.path(), &["run"]);
    assert_exit(&result, 1);
    assert!(result.stdout.starts_with("FAIL props (props): mismatch, "));
    assert!(result.stdout.contains("--- props.reference.dump\n+++ props.reloaded.dump\n"));
    assert!(result.stdout.contains("-Revision-number: 6\n"));
    assert!(dir.path().join("work/repos/props").is_dir());
}

#[test]
fn failing_candidate_is_fatal() {
    if !svn_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "exit 3");

    let result = dumpcheck(dir.path(), &["run", "--", "--bogus"]);
    assert_exit(&result, 128);
    assert!(result.stderr.contains("fatal: candidate dump failed: "));
    assert!(result.stderr.contains("logs/props.log"));
}

#[test]
fn suite_runs_every_scenario_and_mode() {
    if !svn_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), MIRROR_CANDIDATE);

    let result = dumpcheck(
        dir.path(),
        &["suite", "--jobs", "2", "--mode", "", "--mode", "--incremental"],
    );
    assert_exit(&result, 0);
    let mut lines: Vec<_> = result.stdout.lines().collect();
    assert_eq!(lines.pop(), Some("4/4 runs passed"));
    assert_eq!(
        lines,
        vec![
            "PASS props-0 (props, 9 revisions)",
            "PASS props-1 (props, 9 revisions)",
            "PASS content-0 (content, 6 revisions)",
            "PASS content-1 (content, 6 revisions)",
        ]
    );
}
