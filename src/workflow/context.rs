use crate::actions::{RegisterSummary, Services};
use crate::daemon::DaemonLimits;
use crate::model::{DatasetType, MetaValue, Project, ProjectType, ResultKind};
use crate::params::Params;
use crate::report::Reporter;
use crate::util::absolute;
use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Everything a workflow run needs, resolved once from the parameters.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub outdir: PathBuf,
    pub project_type: ProjectType,
    pub dataset_type: DatasetType,
    pub files: Vec<PathBuf>,
    pub taxon: Option<String>,
    /// `--no-draft`: only complete genomes from the remote corpus.
    pub complete_only: bool,
    pub clean: bool,
    pub name_regexp: Option<String>,
    pub daemon_config: Option<PathBuf>,
    pub daemon_bin: Option<PathBuf>,
    pub limits: DaemonLimits,
    /// Workflow-specific project metadata (engines, thresholds, ...).
    pub project_metadata: Vec<(String, MetaValue)>,
    /// Extra metadata for every dataset fetched or ingested by the run.
    pub dataset_metadata: Vec<(String, MetaValue)>,
    pub summaries: Vec<ResultKind>,
}

impl WorkflowSettings {
    pub fn from_params(
        params: &Params,
        project_metadata: Vec<(String, MetaValue)>,
        dataset_metadata: Vec<(String, MetaValue)>,
        summaries: &[ResultKind],
    ) -> Result<Self> {
        let outdir = params
            .path("outdir")
            .ok_or_else(|| anyhow!("outdir is mandatory"))?;
        let project_type = params
            .text("project_type")
            .unwrap_or_default()
            .parse::<ProjectType>()?;
        let dataset_type = params
            .text("dataset_type")
            .unwrap_or_default()
            .parse::<DatasetType>()?;
        Ok(Self {
            outdir,
            project_type,
            dataset_type,
            files: params.files().to_vec(),
            taxon: params.text("taxon").map(str::to_string),
            complete_only: params.flag("no_draft").unwrap_or(false),
            clean: params.flag("clean").unwrap_or(false),
            name_regexp: params.text("regexp").map(str::to_string),
            daemon_config: params.path("daemon").map(|path| absolute(&path)).transpose()?,
            daemon_bin: params.path("daemon_bin"),
            limits: DaemonLimits {
                max_jobs: params.count("jobs")?,
                ppn: params.count("threads")?,
            },
            project_metadata,
            dataset_metadata,
            summaries: summaries.to_vec(),
        })
    }
}

/// Mutable state shared by the stages of one run.
pub struct WorkflowContext<'a> {
    pub settings: WorkflowSettings,
    pub services: &'a Services,
    pub reporter: Reporter,
    pub project: Option<Project>,
    pub created_project: bool,
    /// Datasets registered during this run, with the stage that added them.
    pub registered: Vec<(String, &'static str)>,
    pub fetched: RegisterSummary,
    pub ingested: RegisterSummary,
}

impl<'a> WorkflowContext<'a> {
    pub fn new(settings: WorkflowSettings, services: &'a Services, reporter: Reporter) -> Self {
        Self {
            settings,
            services,
            reporter,
            project: None,
            created_project: false,
            registered: Vec::new(),
            fetched: RegisterSummary::default(),
            ingested: RegisterSummary::default(),
        }
    }

    pub fn project(&self) -> Result<&Project> {
        self.project
            .as_ref()
            .ok_or_else(|| anyhow!("project {} is not loaded", self.settings.outdir.display()))
    }

    pub fn project_mut(&mut self) -> Result<&mut Project> {
        let outdir = self.settings.outdir.display().to_string();
        self.project
            .as_mut()
            .ok_or_else(|| anyhow!("project {outdir} is not loaded"))
    }

    /// Load the project if a previous stage has not already done so.
    pub fn ensure_project(&mut self) -> Result<&Project> {
        if self.project.is_none() {
            self.project = Some(Project::load(&self.settings.outdir)?);
        }
        self.project()
    }
}
