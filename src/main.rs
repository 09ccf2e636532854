//! genoflow: run genome-collection workflows over a persistent project.
mod actions;
mod daemon;
mod dispatch;
mod error;
mod home;
mod model;
mod params;
mod remote;
mod report;
mod util;
mod workflow;

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "GENOFLOW_LOG";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let services = match actions::Services::from_env() {
        Ok(services) => services,
        Err(err) => {
            report::Reporter::default().error(&err);
            return ExitCode::FAILURE;
        }
    };

    match dispatch::launch(argv, &services) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match error::pipeline_error(&err) {
            Some(error::PipelineError::NoAction { .. }) => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        },
    }
}
