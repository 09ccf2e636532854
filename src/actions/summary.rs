//! `summary`: tabulate one result category across datasets.
use super::ls::filter_options;
use super::{Action, ActionRequest, PROJECT_OPT};
use crate::dispatch::options::OptSpec;
use crate::model::{load_and_filter, DatasetFilter, Project, ResultKind};
use crate::params::ParamValue;
use crate::util::{format_table, write_bytes_atomic};
use anyhow::Result;
use std::path::Path;

pub struct Summary;

impl Action for Summary {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn description(&self) -> &'static str {
        "Generate a table of the stats of one result across datasets"
    }

    fn options(&self) -> Vec<OptSpec> {
        let mut options = vec![
            PROJECT_OPT,
            OptSpec::value("result", "result", "Name of the result to summarize")
                .short('r')
                .value_name("CATEGORY"),
            OptSpec::value("output", "output", "Output file")
                .short('o')
                .value_name("PATH"),
        ];
        options.extend(filter_options());
        options.push(OptSpec::flag("tabular", "tab", "Return a tab-delimited table"));
        options
    }

    fn defaults(&self) -> Vec<(&'static str, ParamValue)> {
        vec![("ref", true.into()), ("active", true.into())]
    }

    fn required(&self) -> &'static [(&'static str, &'static str)] {
        &[("project", "-P"), ("result", "-r"), ("output", "-o")]
    }

    fn perform(&self, request: &ActionRequest<'_>) -> Result<()> {
        let params = request.params;
        let project = Project::load(&params.path("project").unwrap_or_default())?;
        let kind: ResultKind = params.text("result").unwrap_or_default().parse()?;
        let filter = DatasetFilter::from_params(params)?;
        let output = params.path("output").unwrap_or_default();
        let rows = write_summary(
            &project,
            kind,
            &filter,
            &output,
            params.flag("tabular").unwrap_or(false),
        )?;
        request
            .reporter
            .say(format!("Summarized {rows} datasets into {}", output.display()));
        Ok(())
    }
}

/// Header is `dataset` plus every metric in first-seen order; cells carry
/// the value without its unit. Datasets lacking the result are left out.
pub fn render_summary(
    project: &Project,
    kind: ResultKind,
    filter: &DatasetFilter,
    tabular: bool,
) -> Result<(String, usize)> {
    let mut metrics: Vec<String> = Vec::new();
    let mut records = Vec::new();
    for dataset in load_and_filter(project, filter)? {
        let Some(result) = dataset.result(kind)? else {
            continue;
        };
        for (metric, _) in result.stats() {
            if !metrics.contains(metric) {
                metrics.push(metric.clone());
            }
        }
        records.push((dataset.name().to_string(), result));
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|(name, result)| {
            std::iter::once(name.clone())
                .chain(metrics.iter().map(|metric| {
                    result
                        .stat(metric)
                        .map(|value| value.to_string())
                        .unwrap_or_default()
                }))
                .collect()
        })
        .collect();
    let header: Vec<&str> = std::iter::once("dataset")
        .chain(metrics.iter().map(String::as_str))
        .collect();
    Ok((format_table(&header, &rows, tabular), rows.len()))
}

pub fn write_summary(
    project: &Project,
    kind: ResultKind,
    filter: &DatasetFilter,
    output: &Path,
    tabular: bool,
) -> Result<usize> {
    let (text, rows) = render_summary(project, kind, filter, tabular)?;
    write_bytes_atomic(output, text.as_bytes())?;
    tracing::debug!(result = %kind, rows, path = %output.display(), "wrote summary");
    Ok(rows)
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
