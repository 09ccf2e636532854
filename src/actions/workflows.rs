//! Workflow actions: option surface, project metadata, and a standard
//! orchestrator run.
use super::{Action, ActionRequest, METADATA_OPT};
use crate::dispatch::options::OptSpec;
use crate::model::{DatasetType, MetaValue, ProjectType, ResultKind};
use crate::params::{ParamValue, Params};
use crate::workflow::{Orchestrator, WorkflowContext, WorkflowSettings};
use anyhow::{anyhow, Result};

const WORKFLOW_REQUIRED: &[(&str, &str)] = &[
    ("outdir", "-o"),
    ("project_type", "--project-type"),
    ("dataset_type", "--type"),
];

pub const ESSENTIAL_COLLECTIONS: &[&str] = &["dupont_2012", "lee_2019"];
pub const HAAI_ENGINES: &[&str] = &["blast+", "blat", "diamond", "no"];
pub const AAI_ENGINES: &[&str] = &["blast+", "blat", "diamond"];
pub const ANI_ENGINES: &[&str] = &["blast+", "blat", "fastani"];

/// Options shared by every workflow.
pub fn workflow_options() -> Vec<OptSpec> {
    vec![
        OptSpec::value("outdir", "out-dir", "Directory to be created with all output data")
            .short('o')
            .value_name("PATH"),
        OptSpec::value("taxon", "ncbi-taxon", "Download all the genomes in NCBI classified as this taxon")
            .short('T')
            .value_name("STRING"),
        OptSpec::flag("no_draft", "no-draft", "Only download complete genomes, not drafts"),
        OptSpec::flag("clean", "clean", "Clean all intermediate files after generating the reports").short('c'),
        OptSpec::value("regexp", "name-regexp", "Regular expression indicating how to extract the name from the input file paths")
            .short('R')
            .value_name("REGEXP"),
        OptSpec::value("dataset_type", "type", "Type of datasets").value_name("TYPE"),
        OptSpec::value("project_type", "project-type", "Type of project").value_name("TYPE"),
        OptSpec::value("daemon", "daemon", "Use custom daemon configuration in JSON format")
            .value_name("PATH"),
        OptSpec::value("daemon_bin", "daemon-bin", "Daemon program to launch").value_name("PATH"),
        OptSpec::integer("jobs", "jobs", "Number of parallel jobs to execute").short('j').value_name("INT"),
        OptSpec::integer("threads", "threads", "Number of threads for each job").short('t').value_name("INT"),
        METADATA_OPT,
    ]
}

fn choice(params: &Params, key: &str, flag: &str, allowed: &[&str]) -> Result<Option<MetaValue>> {
    match params.text(key) {
        None => Ok(None),
        Some(value) if allowed.contains(&value) => Ok(Some(MetaValue::from(value))),
        Some(value) => Err(anyhow!(
            "invalid value for {flag}: {value} (expected one of: {})",
            allowed.join(", ")
        )),
    }
}

/// `--type`/`--project-type` choices with descriptions. Multi-organism
/// types are left out: these workflows handle single genomes.
pub fn recognized_types() -> String {
    let mut out = String::from("Recognized dataset types (--type):\n");
    for kind in DatasetType::ALL.into_iter().filter(|kind| !kind.multi()) {
        out.push_str(&format!("  ~ {kind}: {}\n", kind.description()));
    }
    out.push_str("\nRecognized project types (--project-type):\n");
    for kind in ProjectType::ALL.into_iter().filter(|kind| !kind.multi()) {
        out.push_str(&format!("  ~ {kind}: {}\n", kind.description()));
    }
    out
}

fn run_workflow(
    request: &ActionRequest<'_>,
    project_metadata: Vec<(String, MetaValue)>,
    summaries: &[ResultKind],
) -> Result<()> {
    let settings = WorkflowSettings::from_params(
        request.params,
        project_metadata,
        request.metadata_pairs()?,
        summaries,
    )?;
    let mut ctx = WorkflowContext::new(settings, request.services, request.reporter);
    let report = Orchestrator::standard().run(&mut ctx)?;
    tracing::info!(
        outdir = %ctx.settings.outdir.display(),
        stages = report.outcomes.len(),
        "workflow finished"
    );
    request.reporter.say(format!(
        "Datasets fetched: {}, ingested: {}",
        ctx.fetched.added.len(),
        ctx.ingested.added.len()
    ));
    Ok(())
}

/// `quality_wf`: quality check of a genome collection.
pub struct QualityWorkflow;

impl Action for QualityWorkflow {
    fn name(&self) -> &'static str {
        "quality_wf"
    }

    fn description(&self) -> &'static str {
        "Estimate the quality of genome assemblies"
    }

    fn options(&self) -> Vec<OptSpec> {
        let mut options = workflow_options();
        options.extend([
            OptSpec::integer("min_qual", "min-qual", "Minimum genome quality to include in analysis")
                .value_name("INT"),
            OptSpec::value("ess_coll", "ess-coll", "Collection of essential genes to use (dupont_2012 or lee_2019)")
                .value_name("NAME"),
        ]);
        options
    }

    fn defaults(&self) -> Vec<(&'static str, ParamValue)> {
        vec![
            ("project_type", "genomes".into()),
            ("dataset_type", "popgenome".into()),
            ("min_qual", 25_i64.into()),
            ("ess_coll", "dupont_2012".into()),
        ]
    }

    fn required(&self) -> &'static [(&'static str, &'static str)] {
        WORKFLOW_REQUIRED
    }

    fn notes(&self) -> Option<String> {
        Some(recognized_types())
    }

    fn expects_files(&self) -> bool {
        true
    }

    fn perform(&self, request: &ActionRequest<'_>) -> Result<()> {
        let params = request.params;
        let mut metadata = Vec::new();
        if let Some(min_qual) = params.int("min_qual")? {
            metadata.push(("min_qual".to_string(), MetaValue::Integer(min_qual)));
        }
        if let Some(collection) = choice(params, "ess_coll", "--ess-coll", ESSENTIAL_COLLECTIONS)? {
            metadata.push(("ess_coll".to_string(), collection));
        }
        run_workflow(
            request,
            metadata,
            &[
                ResultKind::Cds,
                ResultKind::Assembly,
                ResultKind::EssentialGenes,
                ResultKind::Ssu,
            ],
        )
    }
}

/// `derep_wf`: dereplicate a clade into representative genomes.
pub struct DerepWorkflow;

impl Action for DerepWorkflow {
    fn name(&self) -> &'static str {
        "derep_wf"
    }

    fn description(&self) -> &'static str {
        "Dereplicate a collection of closely related genomes"
    }

    fn options(&self) -> Vec<OptSpec> {
        let mut options = workflow_options();
        options.extend([
            OptSpec::value("haai_p", "haai-p", "hAAI engine: blast+, blat, diamond, or no").value_name("ENGINE"),
            OptSpec::value("aai_p", "aai-p", "AAI engine: blast+, blat, or diamond").value_name("ENGINE"),
            OptSpec::value("ani_p", "ani-p", "ANI engine: blast+, blat, or fastani").value_name("ENGINE"),
            OptSpec::preset(
                "fast",
                &[("aai_p", "diamond"), ("ani_p", "fastani")],
                "Use faster identity engines (diamond and fastani)",
            ),
            OptSpec::preset(
                "sensitive",
                &[("aai_p", "blast+"), ("ani_p", "blast+")],
                "Use more sensitive identity engines (blast+)",
            ),
        ]);
        options
    }

    fn defaults(&self) -> Vec<(&'static str, ParamValue)> {
        vec![
            ("project_type", "clade".into()),
            ("dataset_type", "popgenome".into()),
        ]
    }

    fn required(&self) -> &'static [(&'static str, &'static str)] {
        WORKFLOW_REQUIRED
    }

    fn notes(&self) -> Option<String> {
        Some(recognized_types())
    }

    fn expects_files(&self) -> bool {
        true
    }

    fn perform(&self, request: &ActionRequest<'_>) -> Result<()> {
        let params = request.params;
        let mut metadata = Vec::new();
        for (key, flag, allowed) in [
            ("haai_p", "--haai-p", HAAI_ENGINES),
            ("aai_p", "--aai-p", AAI_ENGINES),
            ("ani_p", "--ani-p", ANI_ENGINES),
        ] {
            if let Some(engine) = choice(params, key, flag, allowed)? {
                metadata.push((key.to_string(), engine));
            }
        }
        run_workflow(
            request,
            metadata,
            &[
                ResultKind::Cds,
                ResultKind::Assembly,
                ResultKind::EssentialGenes,
                ResultKind::Ssu,
                ResultKind::Distances,
            ],
        )
    }
}
