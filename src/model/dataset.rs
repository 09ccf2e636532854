//! A named dataset inside a project.
//!
//! Every attribute is read through the metadata store; nothing is cached
//! besides the store itself, so `multi` always reflects the current type
//! registry.
use super::metadata::MetadataStore;
use super::paths::ProjectPaths;
use super::result::AnalysisResult;
use super::taxonomy::Taxonomy;
use super::types::{DatasetType, ResultKind};
use anyhow::Result;

pub const TYPE_KEY: &str = "type";
pub const REF_KEY: &str = "ref";
pub const INACTIVE_KEY: &str = "inactive";
pub const TAX_KEY: &str = "tax";

#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    paths: ProjectPaths,
    metadata: MetadataStore,
}

impl Dataset {
    /// Handle on an existing dataset; its metadata is loaded on first access.
    pub fn open(paths: &ProjectPaths, name: &str) -> Self {
        Self {
            name: name.to_string(),
            paths: paths.clone(),
            metadata: MetadataStore::open(paths.dataset_metadata_path(name)),
        }
    }

    /// A dataset that only exists in memory until `save`.
    pub fn fresh(paths: &ProjectPaths, name: &str, kind: DatasetType) -> Result<Self> {
        let mut dataset = Self {
            name: name.to_string(),
            paths: paths.clone(),
            metadata: MetadataStore::empty(paths.dataset_metadata_path(name)),
        };
        dataset.metadata.set(TYPE_KEY, kind.as_str())?;
        Ok(dataset)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataStore {
        &mut self.metadata
    }

    /// Declared type; an unregistered value is an `UnknownType` error.
    pub fn dataset_type(&self) -> Result<Option<DatasetType>> {
        match self.metadata.text(TYPE_KEY)? {
            None => Ok(None),
            Some(raw) => Ok(Some(raw.parse::<DatasetType>()?)),
        }
    }

    /// Reference datasets are the default.
    pub fn is_ref(&self) -> Result<bool> {
        Ok(self.metadata.flag(REF_KEY)?.unwrap_or(true))
    }

    pub fn is_active(&self) -> Result<bool> {
        Ok(!self.metadata.flag(INACTIVE_KEY)?.unwrap_or(false))
    }

    /// True only for a registered multi-organism type.
    pub fn is_multi(&self) -> Result<bool> {
        Ok(self.dataset_type()?.is_some_and(|kind| kind.multi()))
    }

    /// True only for a registered single-organism type; untyped datasets are
    /// neither multi nor non-multi.
    pub fn is_nonmulti(&self) -> Result<bool> {
        Ok(self.dataset_type()?.is_some_and(|kind| !kind.multi()))
    }

    pub fn taxonomy(&self) -> Result<Option<Taxonomy>> {
        Ok(self
            .metadata
            .text(TAX_KEY)?
            .map(Taxonomy::parse)
            .filter(|tax| !tax.is_empty()))
    }

    pub fn result(&self, kind: ResultKind) -> Result<Option<AnalysisResult>> {
        AnalysisResult::load(&self.paths, kind, &self.name)
    }

    pub fn save(&mut self) -> Result<()> {
        self.metadata.save()
    }
}
