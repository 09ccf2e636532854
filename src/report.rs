//! Human-facing diagnostics threaded explicitly through every call.
//!
//! Progress lines are printed only when the invocation asked for `--verbose`;
//! structured events always go through `tracing` so `GENOFLOW_LOG` can surface
//! them independently of the progress stream.
use chrono::Local;
use std::fmt::Display;

/// Verbosity context for a single invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    verbose: bool,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Emit a timestamped progress line to stderr iff verbose.
    pub fn say(&self, message: impl Display) {
        let message = message.to_string();
        tracing::debug!(%message, "progress");
        if self.verbose {
            eprintln!("[{}] {}", Local::now().format("%Y-%m-%d %H:%M:%S %z"), message);
        }
    }

    /// Warnings are always shown.
    pub fn warn(&self, message: impl Display) {
        eprintln!("warning: {message}");
    }

    /// Report an error with its full cause trace.
    pub fn error(&self, err: &anyhow::Error) {
        eprintln!("Exception: {err}");
        eprintln!();
        for cause in err.chain().skip(1) {
            eprintln!("DEBUG: caused by: {cause}");
        }
    }
}
