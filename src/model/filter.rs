//! Dataset selection shared by `ls`, `summary` and the workflow stages.
use super::dataset::Dataset;
use super::project::Project;
use super::taxonomy::Taxonomy;
use crate::params::Params;
use anyhow::{anyhow, Result};

/// Criteria applied by `load_and_filter`; every `None` is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetFilter {
    pub dataset: Option<String>,
    pub reference: Option<bool>,
    pub active: Option<bool>,
    pub multi: Option<bool>,
    pub taxonomy: Option<Taxonomy>,
    /// 1-based position in the already-filtered list.
    pub index: Option<usize>,
    /// Treat a missing named dataset as an error instead of an empty result.
    pub strict: bool,
}

impl DatasetFilter {
    /// Criteria from the common listing options (`-D`, `--ref`, `--active`,
    /// `--multi`, `--taxonomy`, `--dataset-k`).
    pub fn from_params(params: &Params) -> Result<Self> {
        let index = match params.int("dataset_k")? {
            None => None,
            Some(value) if value >= 1 => Some(value as usize),
            Some(value) => return Err(anyhow!("--dataset-k must be at least 1 (got {value})")),
        };
        Ok(Self {
            dataset: params.text("dataset").map(str::to_string),
            reference: params.flag("ref"),
            active: params.flag("active"),
            multi: params.flag("multi"),
            taxonomy: params.text("taxonomy").map(Taxonomy::parse),
            index,
            strict: false,
        })
    }

    pub fn reference_and_active() -> Self {
        Self {
            reference: Some(true),
            active: Some(true),
            ..Self::default()
        }
    }

    /// Apply the criteria in order: role, activity, multiplicity, taxonomy,
    /// then the positional index over whatever survived.
    pub fn apply(&self, candidates: Vec<Dataset>) -> Result<Vec<Dataset>> {
        let mut selected = Vec::with_capacity(candidates.len());
        for dataset in candidates {
            if self.keeps(&dataset)? {
                selected.push(dataset);
            }
        }
        if let Some(index) = self.index {
            return Ok(selected.into_iter().nth(index - 1).into_iter().collect());
        }
        Ok(selected)
    }

    fn keeps(&self, dataset: &Dataset) -> Result<bool> {
        if let Some(reference) = self.reference {
            if dataset.is_ref()? != reference {
                return Ok(false);
            }
        }
        if let Some(active) = self.active {
            if dataset.is_active()? != active {
                return Ok(false);
            }
        }
        if let Some(multi) = self.multi {
            let matches = if multi {
                dataset.is_multi()?
            } else {
                dataset.is_nonmulti()?
            };
            if !matches {
                return Ok(false);
            }
        }
        if let Some(taxon) = &self.taxonomy {
            let inside = dataset
                .taxonomy()?
                .is_some_and(|tax| tax.is_in(taxon));
            if !inside {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Candidate datasets (all, or the one named) narrowed by `filter`.
pub fn load_and_filter(project: &Project, filter: &DatasetFilter) -> Result<Vec<Dataset>> {
    let candidates = match &filter.dataset {
        Some(name) => match project.dataset(name) {
            Some(dataset) => vec![dataset],
            None if filter.strict => {
                return Err(anyhow!(
                    "dataset {name} not found in {}",
                    project.root().display()
                ))
            }
            None => Vec::new(),
        },
        None => project.datasets()?,
    };
    filter.apply(candidates)
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
