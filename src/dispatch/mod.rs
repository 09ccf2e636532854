//! Task dispatch: verb → action → parsed parameters → execution.
//!
//! The dispatcher is a small state machine. Resolution never fails (an
//! unknown verb only warns); execution of an unresolved dispatcher is the
//! `NoAction` error.
pub mod options;

use crate::actions::{self, Action, ActionRequest, Services};
use crate::error::PipelineError;
use crate::params::Params;
use crate::report::Reporter;
use anyhow::{anyhow, bail, Result};
use options::{bind, build_command, VERBOSE_KEY};

/// Legacy and convenience verbs.
pub const ALIASES: &[(&str, &str)] = &[
    ("create", "new"),
    ("ncbi_get", "get"),
    ("add_datasets", "add"),
    ("list", "ls"),
    ("quality", "quality_wf"),
    ("derep", "derep_wf"),
];

/// Verb used when none (or only flags) were given.
pub const DEFAULT_TASK: &str = "generic";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Unresolved,
    Resolved,
    Parsed,
    Executed,
}

pub struct Dispatcher {
    registry: &'static [&'static dyn Action],
    task: String,
    argv: Vec<String>,
    action: Option<&'static dyn Action>,
    params: Option<Params>,
    reporter: Reporter,
    state: DispatchState,
}

impl Dispatcher {
    pub fn new(argv: Vec<String>) -> Self {
        Self::with_registry(argv, actions::registry())
    }

    /// `argv` excludes the program name.
    pub fn with_registry(argv: Vec<String>, registry: &'static [&'static dyn Action]) -> Self {
        let (task, argv) = match argv.split_first() {
            Some((first, rest)) if !first.starts_with('-') => (first.clone(), rest.to_vec()),
            _ => (DEFAULT_TASK.to_string(), argv),
        };
        Self {
            registry,
            task,
            argv,
            action: None,
            params: None,
            reporter: Reporter::default(),
            state: DispatchState::Unresolved,
        }
    }

    #[cfg(test)]
    pub fn task(&self) -> &str {
        &self.task
    }

    #[cfg(test)]
    pub fn state(&self) -> DispatchState {
        self.state
    }

    #[cfg(test)]
    pub fn action(&self) -> Option<&'static dyn Action> {
        self.action
    }

    #[cfg(test)]
    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// Alias table first, then the registry. An unmatched verb is reported
    /// and leaves the dispatcher unresolved.
    pub fn resolve(&mut self) -> Option<&'static dyn Action> {
        let canonical = resolve_alias(&self.task);
        self.action = find_action(self.registry, canonical);
        match self.action {
            Some(action) => {
                tracing::debug!(task = %self.task, action = action.name(), "resolved task");
                self.state = DispatchState::Resolved;
            }
            None => self.reporter.warn(format!("No action set for {}", self.task)),
        }
        self.action
    }

    /// Bind argv against the action's options. Returns `false` when clap
    /// answered the request itself (help or version), in which case nothing
    /// should run.
    pub fn parse(&mut self) -> Result<bool> {
        let action = self.action.ok_or_else(|| PipelineError::NoAction {
            task: self.task.clone(),
        })?;
        let specs = action.options();
        let mut command = build_command(
            action.name(),
            action.description(),
            &specs,
            action.expects_operation(),
            action.expects_files(),
        );
        if let Some(notes) = action.notes() {
            command = command.after_help(notes);
        }
        let argv = std::iter::once(action.name().to_string()).chain(self.argv.iter().cloned());
        let matches = match command.try_get_matches_from(argv) {
            Ok(matches) => matches,
            Err(err) => {
                use clap::error::ErrorKind;
                if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                    err.print()
                        .map_err(|io| anyhow!("print usage for {}: {io}", action.name()))?;
                    return Ok(false);
                }
                return Err(anyhow::Error::new(err));
            }
        };

        let mut params = Params::with_defaults(action.defaults());
        bind(&matches, &specs, &mut params);
        self.reporter = Reporter::new(params.flag(VERBOSE_KEY).unwrap_or(false));
        self.params = Some(params);
        self.state = DispatchState::Parsed;
        Ok(true)
    }

    /// Check mandatory parameters and run the action body.
    pub fn execute(&mut self, services: &Services) -> Result<()> {
        let action = self.action.ok_or_else(|| PipelineError::NoAction {
            task: self.task.clone(),
        })?;
        let params = match (&self.params, self.state) {
            (Some(params), DispatchState::Parsed) => params,
            (_, state) => bail!("{} cannot execute from state {state:?}", action.name()),
        };
        params.require(action.required())?;

        let request = ActionRequest {
            params,
            reporter: self.reporter,
            services,
        };
        let started = std::time::Instant::now();
        action.perform(&request)?;
        tracing::info!(
            action = action.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "action finished"
        );
        self.state = DispatchState::Executed;
        Ok(())
    }

    pub fn reporter(&self) -> Reporter {
        self.reporter
    }

    /// Resolve, parse and execute in one pass.
    pub fn run(&mut self, services: &Services) -> Result<()> {
        if self.resolve().is_none() {
            return Err(PipelineError::NoAction {
                task: self.task.clone(),
            }
            .into());
        }
        if !self.parse()? {
            return Ok(());
        }
        self.execute(services)
    }
}

pub fn resolve_alias(task: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == task)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(task)
}

pub fn find_action(
    registry: &'static [&'static dyn Action],
    name: &str,
) -> Option<&'static dyn Action> {
    registry.iter().copied().find(|action| action.name() == name)
}

/// Top-level entry: dispatch `argv`, report any failure with its cause
/// chain, and hand the error back so the caller can pick an exit code.
pub fn launch(argv: Vec<String>, services: &Services) -> Result<()> {
    let mut dispatcher = Dispatcher::new(argv);
    let outcome = dispatcher.run(services);
    if let Err(err) = &outcome {
        dispatcher.reporter().error(err);
    }
    outcome
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
