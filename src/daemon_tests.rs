use super::{daemon_lines, effective_config, resolve_program, DaemonLimits, DaemonSubmission};
use crate::error::{pipeline_error, PipelineError};
use crate::home::{default_daemon_config, HomeDir, RunControl};
use crate::report::Reporter;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[test]
fn program_resolution_prefers_flag_then_env_then_settings() {
    let settings = RunControl {
        daemon_bin: Some("/from/rc".to_string()),
        ..RunControl::default()
    };
    assert_eq!(
        resolve_program(
            Some(Path::new("/from/flag")),
            Some(OsString::from("/from/env")),
            &settings
        )
        .expect("flag"),
        PathBuf::from("/from/flag")
    );
    assert_eq!(
        resolve_program(None, Some(OsString::from("/from/env")), &settings).expect("env"),
        PathBuf::from("/from/env")
    );
    assert_eq!(
        resolve_program(None, Some(OsString::new()), &settings).expect("rc"),
        PathBuf::from("/from/rc")
    );
}

#[test]
fn relative_programs_are_anchored_at_the_caller_directory() {
    let settings = RunControl::default();
    let cwd = std::env::current_dir().expect("cwd");
    assert_eq!(
        resolve_program(Some(Path::new("./bin/daemon")), None, &settings).expect("relative"),
        cwd.join("./bin/daemon")
    );
    assert_eq!(
        resolve_program(None, Some(OsString::from("tools/daemon")), &settings).expect("env"),
        cwd.join("tools/daemon")
    );
    assert_eq!(
        resolve_program(Some(Path::new("genoflow-daemon")), None, &settings).expect("bare"),
        PathBuf::from("genoflow-daemon")
    );
}

#[test]
fn daemon_output_is_prefixed_without_blank_lines() {
    assert_eq!(
        daemon_lines(b"queued E_coli\n\n  \nfinished\n"),
        vec!["  daemon| queued E_coli", "  daemon| finished"]
    );
    assert!(daemon_lines(b"").is_empty());
}

#[test]
fn command_forwards_limits_and_config() {
    let submission = DaemonSubmission::new(
        PathBuf::from("/opt/genoflow-daemon"),
        PathBuf::from("/work/my project"),
        Some(PathBuf::from("/etc/daemon.json")),
        DaemonLimits {
            max_jobs: Some(4),
            ppn: Some(8),
        },
    );
    assert_eq!(
        submission.args(),
        vec![
            "run",
            "--project",
            "/work/my project",
            "--shutdown-when-done",
            "--json",
            "/etc/daemon.json",
            "--max-jobs",
            "4",
            "--ppn",
            "8"
        ]
    );
    assert_eq!(
        submission.command_line(),
        "/opt/genoflow-daemon run --project '/work/my project' --shutdown-when-done \
         --json /etc/daemon.json --max-jobs 4 --ppn 8"
    );
    assert_eq!(submission.run_directory(), PathBuf::from("/work/my project/daemon"));
}

#[test]
fn explicit_config_must_exist() {
    let dir = tempfile::tempdir().expect("temp dir");
    let home = HomeDir::new(dir.path().to_path_buf());
    let err = effective_config(Some(dir.path().join("absent.json").as_path()), &home)
        .expect_err("missing config");
    assert!(matches!(
        pipeline_error(&err),
        Some(PipelineError::LoadFailure { .. })
    ));

    assert_eq!(effective_config(None, &home).expect("no default"), None);
    home.write_daemon_config(&default_daemon_config())
        .expect("write config");
    let config = effective_config(None, &home)
        .expect("home default")
        .expect("present");
    assert_eq!(config.ppn, Some(2));
}

#[cfg(unix)]
fn fake_daemon(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("fake-daemon");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}

#[cfg(unix)]
#[test]
fn submit_runs_in_the_daemon_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = dir.path().join("proj");
    let script = fake_daemon(dir.path(), "pwd > ran_in.txt\necho \"$@\" > args.txt");
    let submission = DaemonSubmission::new(
        script,
        root.clone(),
        None,
        DaemonLimits {
            max_jobs: Some(2),
            ppn: None,
        },
    );
    submission.submit(Reporter::default()).expect("submit");

    let args = std::fs::read_to_string(root.join("daemon").join("args.txt")).expect("args");
    assert!(args.contains("--shutdown-when-done"));
    assert!(args.contains("--max-jobs 2"));
    assert!(!args.contains("--ppn"));
    assert!(root.join("daemon").join("ran_in.txt").is_file());
}

#[cfg(unix)]
#[test]
fn nonzero_exit_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let script = fake_daemon(dir.path(), "echo boom >&2\nexit 3");
    let submission = DaemonSubmission::new(
        script,
        dir.path().join("proj"),
        None,
        DaemonLimits::default(),
    );
    let err = submission
        .submit(Reporter::default())
        .expect_err("daemon failed");
    assert!(err.to_string().contains("boom"));
}
