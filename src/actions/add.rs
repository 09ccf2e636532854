//! `add`: register local files as datasets.
use super::{Action, ActionRequest, RegisterSummary, METADATA_OPT, PROJECT_OPT};
use crate::dispatch::options::OptSpec;
use crate::model::{DatasetType, MetaValue, Project};
use crate::report::Reporter;
use crate::util::{display_path, sanitize_name};
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Basename minus FastA/FastQ and gzip extensions.
pub const DEFAULT_NAME_REGEXP: &str = r"^(?:.*/)?(.+?)(?i:\.f[nastq]+)?(?:\.gz)?$";

pub struct Add;

impl Action for Add {
    fn name(&self) -> &'static str {
        "add"
    }

    fn description(&self) -> &'static str {
        "Create datasets from input files"
    }

    fn options(&self) -> Vec<OptSpec> {
        vec![
            PROJECT_OPT,
            OptSpec::value("type", "type", "Type of datasets").short('t').value_name("TYPE"),
            OptSpec::value("regexp", "name-regexp", "Regular expression extracting dataset names from file paths (first capture group)")
                .short('R')
                .value_name("REGEXP"),
            OptSpec::flag("query", "query", "Register the datasets as queries, not references"),
            METADATA_OPT,
        ]
    }

    fn required(&self) -> &'static [(&'static str, &'static str)] {
        &[("project", "-P"), ("type", "-t")]
    }

    fn expects_files(&self) -> bool {
        true
    }

    fn perform(&self, request: &ActionRequest<'_>) -> Result<()> {
        let params = request.params;
        let project = Project::load(&params.path("project").unwrap_or_default())?;
        let kind: DatasetType = params.text("type").unwrap_or_default().parse()?;
        let pattern = name_pattern(params.text("regexp"))?;
        let mut extra = Vec::new();
        if params.flag("query").unwrap_or(false) {
            extra.push(("ref".to_string(), MetaValue::Bool(false)));
        }
        extra.extend(request.metadata_pairs()?);

        let summary = ingest_files(
            &project,
            params.files(),
            kind,
            &pattern,
            &extra,
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

pub fn name_pattern(raw: Option<&str>) -> Result<Regex> {
    let raw = raw.unwrap_or(DEFAULT_NAME_REGEXP);
    Regex::new(raw).with_context(|| format!("invalid name regexp {raw:?}"))
}

/// Dataset name from the first capture group, sanitized to `[A-Za-z0-9_]`.
pub fn dataset_name_for(file: &Path, pattern: &Regex) -> Result<String> {
    let text = file.to_string_lossy();
    let captured = pattern
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .map(|group| group.as_str())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("cannot extract a dataset name from {text}"))?;
    Ok(sanitize_name(captured))
}

/// Copy each file under `data/inputs/<name>/` and register it. Names that
/// are taken (in the project, or earlier in this batch) are skipped with a
/// warning.
pub fn ingest_files(
    project: &Project,
    files: &[PathBuf],
    kind: DatasetType,
    pattern: &Regex,
    extra: &[(String, MetaValue)],
    reporter: Reporter,
) -> Result<RegisterSummary> {
    let mut summary = RegisterSummary::default();
    let mut seen = BTreeSet::new();
    for file in files {
        if !file.is_file() {
            return Err(anyhow!("input file not found: {}", file.display()));
        }
        let name = dataset_name_for(file, pattern)?;
        if !seen.insert(name.clone()) || project.has_dataset(&name) {
            reporter.warn(format!("Dataset already exists, skipping: {name}"));
            summary.skipped.push(name);
            continue;
        }

        let file_name = file
            .file_name()
            .ok_or_else(|| anyhow!("{} has no file name", file.display()))?;
        let dest_dir = project.paths().inputs_dir().join(&name);
        fs::create_dir_all(&dest_dir)
            .with_context(|| format!("create {}", dest_dir.display()))?;
        let dest = dest_dir.join(file_name);
        fs::copy(file, &dest)
            .with_context(|| format!("copy {} to {}", file.display(), dest.display()))?;

        let mut metadata = vec![(
            "input_file".to_string(),
            MetaValue::from(display_path(&dest, Some(project.root()))),
        )];
        metadata.extend(extra.iter().cloned());
        if project.register_dataset(&name, kind, &metadata)?.is_some() {
            reporter.say(format!("Registered {name}"));
            summary.added.push(name);
        }
    }
    tracing::info!(
        added = summary.added.len(),
        skipped = summary.skipped.len(),
        "ingested files"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "add_tests.rs"]
mod tests;
