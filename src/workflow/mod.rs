//! Workflow orchestration: a fixed sequence of stages over one project.
//!
//! Stages run in order against a shared `WorkflowContext`; the first failure
//! stops the run and is reported as the failing stage. Every stage is safe
//! to repeat, so a failed run is resumed by running it again.
mod cleanup;
mod context;
mod stages;
mod transfer;

pub use context::{WorkflowContext, WorkflowSettings};

use crate::error::PipelineError;
use anyhow::Result;
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Completed,
    Skipped(&'static str),
}

impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageOutcome::Completed => f.write_str("completed"),
            StageOutcome::Skipped(reason) => write!(f, "skipped ({reason})"),
        }
    }
}

pub trait Stage {
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &mut WorkflowContext<'_>) -> Result<StageOutcome>;
}

/// Outcome of each stage that ran, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowReport {
    pub outcomes: Vec<(&'static str, StageOutcome)>,
}

impl WorkflowReport {
    #[cfg(test)]
    pub fn outcome(&self, stage: &str) -> Option<StageOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, outcome)| *outcome)
    }
}

pub struct Orchestrator {
    stages: Vec<Box<dyn Stage>>,
}

impl Orchestrator {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Bootstrap, fetch, ingest, transfer, analyze, summarize, cleanup.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(stages::Bootstrap),
            Box::new(stages::RemoteFetch),
            Box::new(stages::Ingest),
            Box::new(stages::ProjectTransfer),
            Box::new(stages::Analyze),
            Box::new(stages::Summarize),
            Box::new(stages::Cleanup),
        ])
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn run(&self, ctx: &mut WorkflowContext<'_>) -> Result<WorkflowReport> {
        let mut report = WorkflowReport::default();
        tracing::debug!(
            stages = ?self.stage_names(),
            outdir = %ctx.settings.outdir.display(),
            "starting workflow"
        );
        for stage in &self.stages {
            let name = stage.name();
            let started = Instant::now();
            let outcome = stage
                .run(ctx)
                .map_err(|err| PipelineError::stage(name, err))?;
            tracing::info!(
                stage = name,
                outcome = %outcome,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "stage finished"
            );
            ctx.reporter.say(format!("Stage {name}: {outcome}"));
            report.outcomes.push((name, outcome));
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
