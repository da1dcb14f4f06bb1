//! Child process integration tests.
//!
//! Drives the executor with `sh -c` standing in for an SCM client, so the
//! stdout/stderr plumbing is exercised without any SCM installed.

#![cfg(unix)]

#[path = "common/mod.rs"]
mod common;

use std::path::Path;
use std::time::{Duration, Instant};

use common::{SVN_LOG, Workspace, at};
use scm_changelog::scm::parser::{CvsLogParser, SvnLogParser};
use scm_changelog::scm::{Backend, LogCommand, ScmError, run_log_command};

fn shell(script: &str) -> LogCommand {
    LogCommand::new("sh").arg("-c").arg(script)
}

#[test]
fn test_stdout_is_parsed() {
    let workspace = Workspace::new();
    let log = workspace.write_file("svn.log", SVN_LOG);

    let mut parser = SvnLogParser::new();
    let entries = run_log_command(
        &shell(&format!("cat '{}'", log.display())),
        &workspace.path(),
        Backend::Svn,
        &mut parser,
    )
    .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].author, "evenisse");
    assert_eq!(entries[0].date, at(2002, 8, 26, 14, 33, 26));
    assert_eq!(entries[1].comment, "Initial README\n");
}

#[test]
fn test_runs_in_working_directory() {
    let workspace = Workspace::new();
    workspace.write_file("svn.log", SVN_LOG);

    let mut parser = SvnLogParser::new();
    let entries =
        run_log_command(&shell("cat svn.log"), &workspace.path(), Backend::Svn, &mut parser)
            .unwrap();
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_environment_is_passed() {
    let workspace = Workspace::new();
    workspace.write_file("from-env.log", SVN_LOG);

    let command = shell("cat \"$SCM_LOG\"").env("SCM_LOG", "from-env.log");
    let mut parser = SvnLogParser::new();
    let entries =
        run_log_command(&command, &workspace.path(), Backend::Svn, &mut parser).unwrap();
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_stderr_and_exit_status_are_not_fatal() {
    let workspace = Workspace::new();
    let log = workspace.write_file("svn.log", SVN_LOG);
    let script = format!(
        "echo 'svn: warning: W155010' >&2; cat '{}'; exit 1",
        log.display()
    );

    let mut parser = SvnLogParser::new();
    let entries =
        run_log_command(&shell(&script), &workspace.path(), Backend::Svn, &mut parser).unwrap();
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_large_stderr_does_not_block() {
    let workspace = Workspace::new();
    let mut parser = SvnLogParser::new();
    let script = "i=0; while [ $i -lt 20000 ]; do echo \"warning line $i\" >&2; i=$((i+1)); done";
    let entries =
        run_log_command(&shell(script), &workspace.path(), Backend::Svn, &mut parser).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn test_parse_error_stops_client() {
    let workspace = Workspace::new();
    let mut parser = CvsLogParser::new();
    let script = "printf 'Working file: a.c\\nrevision 1.1\\ndate: yesterday;  author: dion;\\n'; sleep 30";

    let started = Instant::now();
    let err = run_log_command(&shell(script), &workspace.path(), Backend::Cvs, &mut parser)
        .unwrap_err();

    assert!(matches!(err, ScmError::UnparseableDate { .. }));
    assert!(started.elapsed() < Duration::from_secs(20));
}

#[test]
fn test_missing_program() {
    let mut parser = SvnLogParser::new();
    let err = run_log_command(
        &LogCommand::new("scm-changelog-missing-client"),
        Path::new("."),
        Backend::Svn,
        &mut parser,
    )
    .unwrap_err();
    assert!(matches!(err, ScmError::ExecutableNotFound { .. }));
}
