//! `ls`: list the datasets of a project.
use super::{Action, ActionRequest, PROJECT_OPT};
use crate::dispatch::options::OptSpec;
use crate::model::{load_and_filter, Dataset, DatasetFilter, Project};
use crate::util::format_table;
use anyhow::Result;

pub struct Ls;

/// Listing and selection options shared with `summary`.
pub fn filter_options() -> Vec<OptSpec> {
    vec![
        OptSpec::toggle("ref", "ref", "no-ref", "Use only reference (or only query with --no-ref) datasets"),
        OptSpec::toggle("active", "active", "inactive", "Use only active (or only inactive) datasets"),
    ]
}

impl Action for Ls {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn description(&self) -> &'static str {
        "List all registered datasets in a project"
    }

    fn options(&self) -> Vec<OptSpec> {
        let mut options = vec![
            PROJECT_OPT,
            OptSpec::value("dataset", "dataset", "Name of the dataset to list")
                .short('D')
                .value_name("NAME"),
        ];
        options.extend(filter_options());
        options.extend([
            OptSpec::toggle("multi", "multi", "no-multi", "Use only multi-species (or only single-species) datasets"),
            OptSpec::value("taxonomy", "taxonomy", "Use only datasets within this taxon (e.g., g:Escherichia)")
                .value_name("RANK:TAXON"),
            OptSpec::integer("dataset_k", "dataset-k", "Use only the k-th dataset in the list")
                .value_name("INT"),
            OptSpec::flag("info", "info", "Print additional information on each dataset"),
            OptSpec::flag("tabular", "tab", "Return a tab-delimited table"),
        ]);
        options
    }

    fn required(&self) -> &'static [(&'static str, &'static str)] {
        &[("project", "-P")]
    }

    fn perform(&self, request: &ActionRequest<'_>) -> Result<()> {
        let params = request.params;
        let project = Project::load(&params.path("project").unwrap_or_default())?;
        let filter = DatasetFilter::from_params(params)?;
        let datasets = load_and_filter(&project, &filter)?;
        request
            .reporter
            .say(format!("Listing {} datasets", datasets.len()));
        print!(
            "{}",
            render(
                &datasets,
                params.flag("info").unwrap_or(false),
                params.flag("tabular").unwrap_or(false),
            )?
        );
        Ok(())
    }
}

/// Names one per line, or a table of type/role/state/taxonomy with `info`.
pub fn render(datasets: &[Dataset], info: bool, tabular: bool) -> Result<String> {
    if !info {
        let mut out = String::new();
        for dataset in datasets {
            out.push_str(dataset.name());
            out.push('\n');
        }
        return Ok(out);
    }
    let mut rows = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        rows.push(vec![
            dataset.name().to_string(),
            dataset
                .dataset_type()?
                .map(|kind| kind.to_string())
                .unwrap_or_default(),
            if dataset.is_ref()? { "ref" } else { "query" }.to_string(),
            if dataset.is_active()? { "active" } else { "inactive" }.to_string(),
            dataset
                .taxonomy()?
                .map(|tax| tax.to_string())
                .unwrap_or_default(),
        ]);
    }
    Ok(format_table(
        &["name", "type", "role", "state", "tax"],
        &rows,
        tabular,
    ))
}
