use super::{Orchestrator, StageOutcome, WorkflowContext, WorkflowSettings};
use crate::actions::Services;
use crate::daemon::DaemonLimits;
use crate::error::{pipeline_error, PipelineError};
use crate::home::{default_run_control, HomeDir};
use crate::model::{DatasetType, MetaValue, Project, ProjectType, ResultKind};
use crate::remote::{CorpusSource, RemoteRecord, TaxonQuery};
use crate::report::Reporter;
use anyhow::Result;
use std::path::{Path, PathBuf};

struct FakeCorpus {
    records: Vec<RemoteRecord>,
}

impl FakeCorpus {
    fn two_genomes() -> Self {
        let record = |accession: &str| RemoteRecord {
            accession: accession.to_string(),
            organism: "Escherichia coli".to_string(),
            species: "Escherichia coli".to_string(),
            url: format!("https://example.invalid/{accession}_genomic.fna.gz"),
        };
        Self {
            records: vec![record("GCA_000001"), record("GCA_000002")],
        }
    }
}

impl CorpusSource for FakeCorpus {
    fn search(&self, query: &TaxonQuery) -> Result<Vec<RemoteRecord>> {
        if query.taxon == "Unreachable" {
            return Err(anyhow::anyhow!("corpus unavailable"));
        }
        if query.taxon == "Escherichia coli" {
            Ok(self.records.clone())
        } else {
            Ok(Vec::new())
        }
    }

    fn download(&self, record: &RemoteRecord, dest_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dest_dir)?;
        let path = dest_dir.join(format!("{}.fna.gz", record.accession));
        std::fs::write(&path, b"fake assembly")?;
        Ok(path)
    }
}

struct Harness {
    dir: tempfile::TempDir,
    services: Services,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let home = HomeDir::new(dir.path().join("home"));
        let services = Services::new(home, default_run_control(), Box::new(FakeCorpus::two_genomes()));
        Self { dir, services }
    }

    fn root(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn settings(&self, daemon: PathBuf) -> WorkflowSettings {
        WorkflowSettings {
            outdir: self.root(),
            project_type: ProjectType::Clade,
            dataset_type: DatasetType::Popgenome,
            files: Vec::new(),
            taxon: None,
            complete_only: false,
            clean: false,
            name_regexp: None,
            daemon_config: None,
            daemon_bin: Some(daemon),
            limits: DaemonLimits::default(),
            project_metadata: vec![("aai_p".to_string(), MetaValue::from("diamond"))],
            dataset_metadata: Vec::new(),
            summaries: vec![ResultKind::Assembly, ResultKind::Cds],
        }
    }

    fn run(&self, settings: WorkflowSettings) -> Result<super::WorkflowReport> {
        let mut ctx = WorkflowContext::new(settings, &self.services, Reporter::default());
        Orchestrator::standard().run(&mut ctx)
    }

    fn input(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join("inputs").join(name);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, ">c1\nACGT\n").expect("write input");
        path
    }
}

#[cfg(unix)]
fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}

/// Writes an assembly result for every registered dataset.
#[cfg(unix)]
fn fake_daemon(dir: &Path) -> PathBuf {
    script(
        dir,
        "fake-daemon",
        r#"root="$3"
mkdir -p "$root/data/assembly"
for meta in "$root"/metadata/*.json; do
  [ -e "$meta" ] || continue
  name=$(basename "$meta" .json)
  printf '{"stats":{"n50":[1000,"bp"],"contigs":3}}' > "$root/data/assembly/$name.json"
done"#,
    )
}

#[cfg(unix)]
fn run_counts(root: &Path, stage: &str) -> Vec<(String, i64)> {
    let project = Project::load(root).expect("load project");
    project
        .datasets()
        .expect("datasets")
        .iter()
        .map(|dataset| {
            (
                dataset.name().to_string(),
                dataset.metadata().run_count(stage).expect("count"),
            )
        })
        .collect()
}

#[test]
fn standard_pipeline_order() {
    assert_eq!(
        Orchestrator::standard().stage_names(),
        vec!["bootstrap", "fetch", "ingest", "transfer", "analyze", "summarize", "cleanup"]
    );
}

#[cfg(unix)]
#[test]
fn fresh_root_with_taxon_creates_fetches_and_skips_the_rest() {
    let harness = Harness::new();
    let daemon = fake_daemon(harness.dir.path());
    let mut settings = harness.settings(daemon);
    settings.taxon = Some("Escherichia coli".to_string());

    let report = harness.run(settings).expect("workflow");
    assert_eq!(report.outcome("bootstrap"), Some(StageOutcome::Completed));
    assert_eq!(report.outcome("fetch"), Some(StageOutcome::Completed));
    assert!(matches!(report.outcome("ingest"), Some(StageOutcome::Skipped(_))));
    assert_eq!(report.outcome("analyze"), Some(StageOutcome::Completed));
    assert!(matches!(report.outcome("cleanup"), Some(StageOutcome::Skipped(_))));

    let root = harness.root();
    let project = Project::load(&root).expect("load");
    assert_eq!(project.project_type(), ProjectType::Clade);
    assert_eq!(project.metadata().text("aai_p").expect("read"), Some("diamond"));
    assert_eq!(project.metadata().run_count("bootstrap").expect("count"), 1);
    assert_eq!(
        project.dataset_names().expect("names"),
        vec!["Escherichia_coli_GCA_000001", "Escherichia_coli_GCA_000002"]
    );
    let dataset = project.dataset("Escherichia_coli_GCA_000001").expect("dataset");
    assert_eq!(dataset.dataset_type().expect("type"), Some(DatasetType::Popgenome));
    assert_eq!(dataset.metadata().run_count("fetch").expect("count"), 1);
    assert_eq!(dataset.metadata().run_count("analyze").expect("count"), 1);

    let assembly = std::fs::read_to_string(root.join("assembly.tsv")).expect("summary");
    assert_eq!(assembly.lines().next(), Some("dataset\tcontigs\tn50"));
    assert_eq!(assembly.lines().count(), 3);
    assert_eq!(
        std::fs::read_to_string(root.join("cds.tsv")).expect("summary"),
        "dataset\n"
    );
}

#[cfg(unix)]
#[test]
fn rerun_is_idempotent_and_counters_never_decrease() {
    let harness = Harness::new();
    let daemon = fake_daemon(harness.dir.path());
    let input = harness.input("S_enterica.fna");
    let mut settings = harness.settings(daemon);
    settings.taxon = Some("Escherichia coli".to_string());
    settings.files = vec![input];

    harness.run(settings.clone()).expect("first run");
    let root = harness.root();
    let first_fetch = run_counts(&root, "fetch");
    let first_analysis = run_counts(&root, "analyze");

    let report = harness.run(settings).expect("second run");
    assert!(matches!(report.outcome("bootstrap"), Some(StageOutcome::Skipped(_))));
    assert_eq!(report.outcome("fetch"), Some(StageOutcome::Completed));
    assert_eq!(report.outcome("ingest"), Some(StageOutcome::Completed));

    let second_fetch = run_counts(&root, "fetch");
    let second_analysis = run_counts(&root, "analyze");
    let names = |counts: &[(String, i64)]| -> Vec<String> {
        counts.iter().map(|(name, _)| name.clone()).collect()
    };
    assert_eq!(names(&first_fetch), names(&second_fetch));
    assert_eq!(first_fetch, second_fetch);
    for ((_, before), (_, after)) in first_analysis.iter().zip(&second_analysis) {
        assert!(after >= before);
    }
    assert!(names(&second_fetch).contains(&"S_enterica".to_string()));
    let ingest_counts = run_counts(&root, "ingest");
    assert!(ingest_counts.contains(&("S_enterica".to_string(), 1)));
}

#[cfg(unix)]
#[test]
fn transfer_resets_project_progress_on_every_run() {
    let harness = Harness::new();
    let daemon = fake_daemon(harness.dir.path());
    harness.run(harness.settings(daemon.clone())).expect("first run");

    let root = harness.root();
    let mut project = Project::load(&root).expect("load");
    project
        .metadata_mut()
        .set("ref_project", "/elsewhere")
        .expect("set");
    project.metadata_mut().set("run_stale", 9_i64).expect("set");
    project.save().expect("save");

    harness.run(harness.settings(daemon)).expect("second run");
    let project = Project::load(&root).expect("reload");
    assert_eq!(project.metadata().get("ref_project").expect("read"), None);
    assert_eq!(project.metadata().run_count("stale").expect("count"), 0);
    assert_eq!(project.metadata().run_count("transfer").expect("count"), 1);
    assert_eq!(project.metadata().run_count("bootstrap").expect("count"), 0);
}

#[test]
fn failed_fetch_still_clears_stale_project_progress() {
    let harness = Harness::new();
    let root = harness.root();
    let mut project = Project::create(&root, ProjectType::Clade, &[]).expect("create");
    project
        .metadata_mut()
        .set("ref_project", "/elsewhere")
        .expect("set");
    project.metadata_mut().set("run_stale", 3_i64).expect("set");
    project.save().expect("save");

    let mut settings = harness.settings(PathBuf::from("/nonexistent/daemon"));
    settings.taxon = Some("Unreachable".to_string());
    let err = harness.run(settings).expect_err("corpus fails");
    assert!(matches!(
        pipeline_error(&err),
        Some(PipelineError::StageExecution { stage: "fetch", .. })
    ));

    let project = Project::load(&root).expect("reload");
    assert_eq!(project.metadata().get("ref_project").expect("read"), None);
    assert_eq!(project.metadata().run_count("stale").expect("count"), 0);
}

#[test]
fn dataset_metadata_reaches_ingested_datasets() {
    let harness = Harness::new();
    let mut settings = harness.settings(PathBuf::from("/nonexistent/daemon"));
    settings.files = vec![harness.input("E_coli.fna")];
    settings.dataset_metadata = vec![("ref".to_string(), MetaValue::Bool(false))];
    // Stops at analyze; ingestion and transfer have already persisted.
    assert!(harness.run(settings).is_err());

    let project = Project::load(&harness.root()).expect("load");
    let dataset = project.dataset("E_coli").expect("registered");
    assert!(!dataset.is_ref().expect("role"));
    assert_eq!(dataset.metadata().run_count("ingest").expect("count"), 1);
}

#[cfg(unix)]
#[test]
fn clean_removes_intermediates_and_keeps_summaries() {
    let harness = Harness::new();
    let daemon = fake_daemon(harness.dir.path());
    let mut settings = harness.settings(daemon);
    settings.files = vec![harness.input("E_coli.fna")];
    settings.clean = true;

    let report = harness.run(settings).expect("workflow");
    assert_eq!(report.outcome("cleanup"), Some(StageOutcome::Completed));

    let root = harness.root();
    for gone in ["data", "daemon", "metadata", "project.json"] {
        assert!(!root.join(gone).exists(), "{gone} should be removed");
    }
    assert!(root.join("assembly.tsv").is_file());
    assert!(root.join("cds.tsv").is_file());
}

#[cfg(unix)]
#[test]
fn daemon_failure_stops_before_summaries() {
    let harness = Harness::new();
    let daemon = script(harness.dir.path(), "broken-daemon", "echo 'queue offline' >&2\nexit 1");
    let mut settings = harness.settings(daemon);
    settings.files = vec![harness.input("E_coli.fna")];

    let err = harness.run(settings).expect_err("daemon fails");
    assert!(matches!(
        pipeline_error(&err),
        Some(PipelineError::StageExecution { stage: "analyze", .. })
    ));
    let root = harness.root();
    assert!(!root.join("assembly.tsv").exists());
    assert_eq!(run_counts(&root, "analyze"), vec![("E_coli".to_string(), 0)]);
    assert_eq!(run_counts(&root, "ingest"), vec![("E_coli".to_string(), 1)]);
}
