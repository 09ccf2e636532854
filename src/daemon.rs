//! Blocking submission of a project to the external analysis daemon.
//!
//! The daemon is asked to process everything pending and shut down when
//! done; this module only builds that invocation, forwards concurrency
//! limits, and waits for it.
use crate::error::PipelineError;
use crate::home::{load_daemon_config, DaemonConfig, HomeDir, RunControl};
use crate::report::Reporter;
use crate::util::absolute;
use anyhow::{anyhow, Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

pub const DAEMON_BIN_ENV: &str = "GENOFLOW_DAEMON_BIN";
pub const DEFAULT_DAEMON_PROGRAM: &str = "genoflow-daemon";

/// Concurrency limits forwarded to the daemon (`-j`, `-t`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DaemonLimits {
    pub max_jobs: Option<u32>,
    pub ppn: Option<u32>,
}

/// Pick the daemon program: explicit flag, then environment, then the
/// run-control setting, then `PATH`. The daemon runs in `<root>/daemon`, so
/// relative paths with a directory part are anchored at the caller's cwd;
/// bare names are left for `PATH` lookup.
pub fn resolve_program(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    run_control: &RunControl,
) -> Result<PathBuf> {
    let chosen = explicit
        .map(Path::to_path_buf)
        .or_else(|| env_value.filter(|value| !value.is_empty()).map(PathBuf::from))
        .or_else(|| {
            run_control
                .daemon_bin
                .as_deref()
                .filter(|path| !path.is_empty())
                .map(PathBuf::from)
        });
    match chosen {
        Some(program) if program.components().count() > 1 => absolute(&program),
        Some(program) => Ok(program),
        None => which::which(DEFAULT_DAEMON_PROGRAM)
            .map_err(|_| PipelineError::missing("daemon_bin", "--daemon-bin").into()),
    }
}

/// Daemon configuration in effect: the explicit file (which must exist),
/// else the home default, else nothing.
pub fn effective_config(explicit: Option<&Path>, home: &HomeDir) -> Result<Option<DaemonConfig>> {
    match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(PipelineError::LoadFailure {
                    what: "daemon configuration",
                    path: path.to_path_buf(),
                }
                .into());
            }
            Ok(Some(load_daemon_config(path)?))
        }
        None => {
            let path = home.daemon_config_path();
            if path.is_file() {
                Ok(Some(load_daemon_config(&path)?))
            } else {
                Ok(None)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DaemonSubmission {
    program: PathBuf,
    project_root: PathBuf,
    config: Option<PathBuf>,
    limits: DaemonLimits,
}

impl DaemonSubmission {
    pub fn new(
        program: PathBuf,
        project_root: PathBuf,
        config: Option<PathBuf>,
        limits: DaemonLimits,
    ) -> Self {
        Self {
            program,
            project_root,
            config,
            limits,
        }
    }

    pub fn run_directory(&self) -> PathBuf {
        self.project_root.join("daemon")
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--project".to_string(),
            self.project_root.display().to_string(),
            "--shutdown-when-done".to_string(),
        ];
        if let Some(config) = &self.config {
            args.push("--json".to_string());
            args.push(config.display().to_string());
        }
        if let Some(max_jobs) = self.limits.max_jobs {
            args.push("--max-jobs".to_string());
            args.push(max_jobs.to_string());
        }
        if let Some(ppn) = self.limits.ppn {
            args.push("--ppn".to_string());
            args.push(ppn.to_string());
        }
        args
    }

    /// Shell-quoted rendering for logs.
    pub fn command_line(&self) -> String {
        let program = self.program.display().to_string();
        shell_words::join(std::iter::once(program.as_str()).chain(self.args().iter().map(String::as_str)))
    }

    /// Run the daemon in `<root>/daemon` and block until it exits.
    pub fn submit(&self, reporter: Reporter) -> Result<()> {
        let run_dir = self.run_directory();
        fs::create_dir_all(&run_dir).with_context(|| format!("create {}", run_dir.display()))?;
        let caller_dir = std::env::current_dir().ok();

        reporter.say(format!("Launching daemon: {}", self.command_line()));
        let start = Instant::now();
        let output = Command::new(&self.program)
            .args(self.args())
            .current_dir(&run_dir)
            .output()
            .with_context(|| format!("spawn daemon {}", self.program.display()));

        if let Some(dir) = caller_dir {
            if std::env::current_dir().ok().as_ref() != Some(&dir) {
                std::env::set_current_dir(&dir)
                    .with_context(|| format!("restore working directory {}", dir.display()))?;
            }
        }
        let output = output?;
        let elapsed_ms = start.elapsed().as_millis();
        tracing::info!(
            elapsed_ms,
            status = ?output.status.code(),
            command = %self.command_line(),
            "daemon finished"
        );

        if reporter.verbose() {
            relay_lines(&output.stdout);
            relay_lines(&output.stderr);
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "daemon exited with status {}: {}",
                output.status,
                stderr.trim()
            ));
        }
        Ok(())
    }
}

/// Echo captured daemon output to stderr, one prefixed line at a time.
fn relay_lines(captured: &[u8]) {
    for line in daemon_lines(captured) {
        eprintln!("{line}");
    }
}

fn daemon_lines(captured: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(captured)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("  daemon| {line}"))
        .collect()
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
