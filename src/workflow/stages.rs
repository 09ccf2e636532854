//! The standard stages, in pipeline order.
use super::cleanup::remove_intermediates;
use super::context::WorkflowContext;
use super::transfer::transfer;
use super::{Stage, StageOutcome};
use crate::actions::add::{ingest_files, name_pattern};
use crate::actions::get::fetch_into;
use crate::actions::summary::write_summary;
use crate::daemon::{effective_config, resolve_program, DaemonSubmission, DAEMON_BIN_ENV};
use crate::model::dataset::TYPE_KEY;
use crate::model::{DatasetFilter, MetaValue, Project};
use crate::remote::TaxonQuery;
use anyhow::Result;

pub struct Bootstrap;

impl Stage for Bootstrap {
    fn name(&self) -> &'static str {
        "bootstrap"
    }

    fn run(&self, ctx: &mut WorkflowContext<'_>) -> Result<StageOutcome> {
        let outdir = ctx.settings.outdir.clone();
        if Project::exists(&outdir) {
            let existing = ctx.ensure_project()?.project_type();
            if existing != ctx.settings.project_type {
                ctx.reporter.warn(format!(
                    "Keeping existing {existing} project at {}, ignoring --project-type {}",
                    outdir.display(),
                    ctx.settings.project_type
                ));
            }
            return Ok(StageOutcome::Skipped("project already exists"));
        }
        ctx.reporter
            .say(format!("Creating project: {}", outdir.display()));
        let project = Project::create(&outdir, ctx.settings.project_type, &[])?;
        ctx.project = Some(project);
        ctx.created_project = true;
        Ok(StageOutcome::Completed)
    }
}

pub struct RemoteFetch;

impl Stage for RemoteFetch {
    fn name(&self) -> &'static str {
        "fetch"
    }

    fn run(&self, ctx: &mut WorkflowContext<'_>) -> Result<StageOutcome> {
        reset_project_progress(ctx)?;
        let Some(taxon) = ctx.settings.taxon.clone() else {
            return Ok(StageOutcome::Skipped("no taxon requested"));
        };
        let query = TaxonQuery {
            taxon,
            complete_only: ctx.settings.complete_only,
            max: None,
        };
        let summary = fetch_into(
            ctx.project()?,
            ctx.services.corpus.as_ref(),
            &query,
            ctx.settings.dataset_type,
            &ctx.settings.dataset_metadata,
            ctx.reporter,
        )?;
        ctx.registered
            .extend(summary.added.iter().map(|name| (name.clone(), self.name())));
        ctx.fetched = summary;
        Ok(StageOutcome::Completed)
    }
}

/// Clear the project's `run_*` counters and `ref_project` before anything is
/// fetched or ingested, so a run that fails midway leaves no stale progress.
fn reset_project_progress(ctx: &mut WorkflowContext<'_>) -> Result<()> {
    let store = ctx.project_mut()?.metadata_mut();
    let cleared = store.reset_progress()?;
    if !cleared.is_empty() {
        store.save()?;
        tracing::debug!(path = %store.path().display(), cleared = ?cleared, "reset project progress");
    }
    Ok(())
}

pub struct Ingest;

impl Stage for Ingest {
    fn name(&self) -> &'static str {
        "ingest"
    }

    fn run(&self, ctx: &mut WorkflowContext<'_>) -> Result<StageOutcome> {
        if ctx.settings.files.is_empty() {
            return Ok(StageOutcome::Skipped("no input files"));
        }
        let pattern = name_pattern(ctx.settings.name_regexp.as_deref())?;
        let summary = ingest_files(
            ctx.project()?,
            &ctx.settings.files,
            ctx.settings.dataset_type,
            &pattern,
            &ctx.settings.dataset_metadata,
            ctx.reporter,
        )?;
        ctx.registered
            .extend(summary.added.iter().map(|name| (name.clone(), self.name())));
        ctx.ingested = summary;
        Ok(StageOutcome::Completed)
    }
}

/// Reset-then-apply for every entity this run created, and for the project
/// with the workflow's own metadata.
pub struct ProjectTransfer;

impl Stage for ProjectTransfer {
    fn name(&self) -> &'static str {
        "transfer"
    }

    fn run(&self, ctx: &mut WorkflowContext<'_>) -> Result<StageOutcome> {
        let fresh = vec![(
            TYPE_KEY.to_string(),
            MetaValue::from(ctx.settings.dataset_type.as_str()),
        )];
        let registered = ctx.registered.clone();
        for (name, origin) in &registered {
            let Some(mut dataset) = ctx.project()?.dataset(name) else {
                continue;
            };
            transfer(dataset.metadata_mut(), &fresh, &[*origin])?;
        }

        let mut stages = vec![self.name()];
        if ctx.created_project {
            stages.insert(0, "bootstrap");
        }
        let project_metadata = ctx.settings.project_metadata.clone();
        transfer(ctx.project_mut()?.metadata_mut(), &project_metadata, &stages)?;
        ctx.reporter.say(format!(
            "Transferred metadata to {} new datasets",
            registered.len()
        ));
        Ok(StageOutcome::Completed)
    }
}

pub struct Analyze;

impl Stage for Analyze {
    fn name(&self) -> &'static str {
        "analyze"
    }

    fn run(&self, ctx: &mut WorkflowContext<'_>) -> Result<StageOutcome> {
        let settings = &ctx.settings;
        let program = resolve_program(
            settings.daemon_bin.as_deref(),
            std::env::var_os(DAEMON_BIN_ENV),
            &ctx.services.run_control,
        )?;
        if let Some(config) = effective_config(settings.daemon_config.as_deref(), &ctx.services.home)? {
            ctx.reporter.say(format!(
                "Daemon limits: maxjobs={} ppn={}",
                settings
                    .limits
                    .max_jobs
                    .or(config.maxjobs)
                    .map_or_else(|| "-".to_string(), |value| value.to_string()),
                settings
                    .limits
                    .ppn
                    .or(config.ppn)
                    .map_or_else(|| "-".to_string(), |value| value.to_string()),
            ));
        }
        let project = ctx.project()?;
        let submission = DaemonSubmission::new(
            program,
            project.root().to_path_buf(),
            settings.daemon_config.clone(),
            settings.limits,
        );
        submission.submit(ctx.reporter)?;

        let active = DatasetFilter {
            active: Some(true),
            ..DatasetFilter::default()
        };
        for mut dataset in crate::model::load_and_filter(project, &active)? {
            dataset.metadata_mut().bump_run(self.name())?;
            dataset.save()?;
        }
        Ok(StageOutcome::Completed)
    }
}

pub struct Summarize;

impl Stage for Summarize {
    fn name(&self) -> &'static str {
        "summarize"
    }

    fn run(&self, ctx: &mut WorkflowContext<'_>) -> Result<StageOutcome> {
        let project = ctx.project()?;
        let filter = DatasetFilter::reference_and_active();
        for kind in &ctx.settings.summaries {
            let output = project.paths().summary_path(*kind);
            let rows = write_summary(project, *kind, &filter, &output, true)?;
            ctx.reporter
                .say(format!("Summary {kind}: {rows} datasets"));
        }
        Ok(StageOutcome::Completed)
    }
}

pub struct Cleanup;

impl Stage for Cleanup {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn run(&self, ctx: &mut WorkflowContext<'_>) -> Result<StageOutcome> {
        if !ctx.settings.clean {
            return Ok(StageOutcome::Skipped("--clean not set"));
        }
        let Some(project) = ctx.project.take() else {
            return Ok(StageOutcome::Skipped("no project loaded"));
        };
        let removed = remove_intermediates(project.paths())?;
        ctx.reporter
            .say(format!("Removed {} intermediate paths", removed.len()));
        Ok(StageOutcome::Completed)
    }
}
