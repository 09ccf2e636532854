//! `get`: download genomes for a taxon and register them as datasets.
use super::{Action, ActionRequest, RegisterSummary, METADATA_OPT, PROJECT_OPT};
use crate::dispatch::options::OptSpec;
use crate::model::{DatasetType, MetaValue, Project};
use crate::remote::{CorpusSource, TaxonQuery};
use crate::report::Reporter;
use crate::util::display_path;
use anyhow::{Context, Result};
use std::collections::BTreeSet;

pub struct Get;

impl Action for Get {
    fn name(&self) -> &'static str {
        "get"
    }

    fn description(&self) -> &'static str {
        "Download genomes of a taxon from NCBI into a project"
    }

    fn options(&self) -> Vec<OptSpec> {
        vec![
            PROJECT_OPT,
            OptSpec::value("taxon", "taxon", "Taxon name (e.g., a species binomial)")
                .short('T')
                .value_name("NAME"),
            OptSpec::flag("complete", "complete", "Download only complete genomes"),
            OptSpec::flag("all", "all", "Download complete and draft genomes (default)"),
            OptSpec::integer("max", "max", "Maximum number of datasets to download")
                .value_name("INT"),
            METADATA_OPT,
        ]
    }

    fn required(&self) -> &'static [(&'static str, &'static str)] {
        &[("project", "-P"), ("taxon", "-T")]
    }

    fn perform(&self, request: &ActionRequest<'_>) -> Result<()> {
        let params = request.params;
        let project = Project::load(&params.path("project").unwrap_or_default())?;
        let max = params
            .count("max")?
            .map(|value| value as usize);
        let query = TaxonQuery {
            taxon: params.text("taxon").unwrap_or_default().to_string(),
            complete_only: params.flag("complete").unwrap_or(false)
                && !params.flag("all").unwrap_or(false),
            max,
        };
        let summary = fetch_into(
            &project,
            request.services.corpus.as_ref(),
            &query,
            DatasetType::Genome,
            &request.metadata_pairs()?,
            request.reporter,
        )?;
        println!(
            "Datasets added: {} (skipped: {})",
            summary.added.len(),
            summary.skipped.len()
        );
        Ok(())
    }
}

/// Search the corpus and register every record whose name is free.
/// Records with a taken name are skipped before downloading.
pub fn fetch_into(
    project: &Project,
    corpus: &dyn CorpusSource,
    query: &TaxonQuery,
    kind: DatasetType,
    extra: &[(String, MetaValue)],
    reporter: Reporter,
) -> Result<RegisterSummary> {
    let records = corpus
        .search(query)
        .with_context(|| format!("search remote corpus for {}", query.taxon))?;
    reporter.say(format!("Found {} assemblies for {}", records.len(), query.taxon));

    let downloads = project.paths().downloads_dir();
    let mut summary = RegisterSummary::default();
    let mut seen = BTreeSet::new();
    for record in &records {
        let name = record.dataset_name();
        if !seen.insert(name.clone()) || project.has_dataset(&name) {
            tracing::debug!(dataset = %name, "dataset already present");
            summary.skipped.push(name);
            continue;
        }
        let file = corpus.download(record, &downloads)?;
        let mut metadata = vec![
            ("ncbi_asm".to_string(), MetaValue::from(record.accession.as_str())),
            ("web_assembly_gz".to_string(), MetaValue::from(record.url.as_str())),
            (
                "input_file".to_string(),
                MetaValue::from(display_path(&file, Some(project.root()))),
            ),
        ];
        if let Some(tax) = record.taxonomy_label() {
            metadata.push(("tax".to_string(), MetaValue::from(tax)));
        }
        metadata.extend(extra.iter().cloned());
        if project
            .register_dataset(&name, kind, &metadata)?
            .is_some()
        {
            reporter.say(format!("Registered {name}"));
            summary.added.push(name);
        }
    }
    tracing::info!(
        taxon = %query.taxon,
        added = summary.added.len(),
        skipped = summary.skipped.len(),
        "remote fetch"
    );
    Ok(summary)
}
