//! Registered actions and the services they share.
pub mod add;
pub mod generic;
pub mod get;
pub mod init;
pub mod ls;
pub mod new;
pub mod summary;
pub mod workflows;

use crate::dispatch::options::OptSpec;
use crate::home::{HomeDir, RunControl};
use crate::model::{parse_metadata_pairs, MetaValue};
use crate::params::{ParamValue, Params};
use crate::remote::{CorpusSource, NcbiClient};
use crate::report::Reporter;
use anyhow::{Context, Result};

/// A task the dispatcher can run.
pub trait Action: Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn options(&self) -> Vec<OptSpec> {
        Vec::new()
    }

    fn defaults(&self) -> Vec<(&'static str, ParamValue)> {
        Vec::new()
    }

    /// Mandatory parameters as `(key, flag)`; checked before `perform`.
    fn required(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    fn expects_operation(&self) -> bool {
        false
    }

    fn expects_files(&self) -> bool {
        false
    }

    /// Extra text appended to `--help`.
    fn notes(&self) -> Option<String> {
        None
    }

    fn perform(&self, request: &ActionRequest<'_>) -> Result<()>;
}

/// Long-lived collaborators handed to every action.
pub struct Services {
    pub home: HomeDir,
    pub run_control: RunControl,
    pub corpus: Box<dyn CorpusSource>,
}

impl Services {
    pub fn new(home: HomeDir, run_control: RunControl, corpus: Box<dyn CorpusSource>) -> Self {
        Self {
            home,
            run_control,
            corpus,
        }
    }

    /// Home from `GENOFLOW_HOME`/the user home, settings from its
    /// `.genoflow_rc`, NCBI as the remote corpus.
    pub fn from_env() -> Result<Self> {
        let home = HomeDir::from_env()?;
        if !home.is_initialized() {
            tracing::debug!(home = %home.root().display(), "home not initialized, using defaults");
        }
        let run_control = home
            .load_run_control()
            .with_context(|| format!("load {}", home.rc_path().display()))?;
        let corpus = Box::new(NcbiClient::new(run_control.ncbi_api_key.clone()));
        Ok(Self::new(home, run_control, corpus))
    }
}

/// Outcome of registering a batch of datasets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterSummary {
    pub added: Vec<String>,
    /// Names that were already taken (in the project or earlier in the batch).
    pub skipped: Vec<String>,
}

pub struct ActionRequest<'a> {
    pub params: &'a Params,
    pub reporter: Reporter,
    pub services: &'a Services,
}

impl ActionRequest<'_> {
    /// Parsed `-m key=value,...` pairs across every `-m`, empty when not given.
    pub fn metadata_pairs(&self) -> Result<Vec<(String, MetaValue)>> {
        let mut pairs = Vec::new();
        for raw in self.params.list("metadata") {
            pairs.extend(parse_metadata_pairs(&raw)?);
        }
        Ok(pairs)
    }
}

/// `-P/--project`, shared by every project-scoped action.
pub const PROJECT_OPT: OptSpec =
    OptSpec::value("project", "project", "Path to the project").short('P').value_name("PATH");

/// `-m/--metadata`, repeatable.
pub const METADATA_OPT: OptSpec = OptSpec::list(
    "metadata",
    "metadata",
    "Metadata as key-value pairs separated by = and delimited by comma",
)
.short('m')
.value_name("k=v,...");

static ACTIONS: &[&dyn Action] = &[
    &generic::Generic,
    &init::Init,
    &new::New,
    &get::Get,
    &add::Add,
    &ls::Ls,
    &summary::Summary,
    &workflows::QualityWorkflow,
    &workflows::DerepWorkflow,
];

pub fn registry() -> &'static [&'static dyn Action] {
    ACTIONS
}
