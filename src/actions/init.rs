//! `init`: write the run-control marker and default daemon configuration.
use super::{Action, ActionRequest};
use crate::dispatch::options::OptSpec;
use crate::home::{default_daemon_config, default_run_control, HomeDir, RunControl};
use crate::util::display_path;
use anyhow::Result;

pub struct Init;

impl Action for Init {
    fn name(&self) -> &'static str {
        "init"
    }

    fn description(&self) -> &'static str {
        "Initialize the home configuration"
    }

    fn options(&self) -> Vec<OptSpec> {
        vec![
            OptSpec::flag("force", "force", "Overwrite existing configuration files"),
            OptSpec::value("daemon_bin", "daemon-bin", "Daemon program to record in the run-control file")
                .value_name("PATH"),
        ]
    }

    fn perform(&self, request: &ActionRequest<'_>) -> Result<()> {
        let force = request.params.flag("force").unwrap_or(false);
        let settings = RunControl {
            daemon_bin: request.params.text("daemon_bin").map(str::to_string),
            ..default_run_control()
        };
        let written = initialize(&request.services.home, &settings, force)?;
        for path in &written {
            request
                .reporter
                .say(format!("wrote {}", display_path(path, None)));
        }
        if written.is_empty() {
            request.reporter.warn(format!(
                "{} is already initialized (use --force to overwrite)",
                request.services.home.root().display()
            ));
        }
        Ok(())
    }
}

/// Write whichever marker files are missing (or all with `force`).
pub fn initialize(
    home: &HomeDir,
    settings: &RunControl,
    force: bool,
) -> Result<Vec<std::path::PathBuf>> {
    let mut written = Vec::new();
    if force || !home.rc_path().is_file() {
        home.write_run_control(settings)?;
        written.push(home.rc_path());
    }
    if force || !home.daemon_config_path().is_file() {
        home.write_daemon_config(&default_daemon_config())?;
        written.push(home.daemon_config_path());
    }
    tracing::info!(home = %home.root().display(), files = written.len(), "initialized home");
    Ok(written)
}
