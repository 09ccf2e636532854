//! Projects: a root directory, a manifest, and the datasets listed under
//! `metadata/`.
use super::dataset::{Dataset, TYPE_KEY};
use super::metadata::{MetaValue, MetadataStore};
use super::paths::ProjectPaths;
use super::types::{DatasetType, ProjectType};
use crate::error::PipelineError;
use crate::util::{absolute, is_valid_name};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub struct Project {
    paths: ProjectPaths,
    project_type: ProjectType,
    metadata: MetadataStore,
}

impl Project {
    /// A project exists iff its manifest does.
    pub fn exists(root: &Path) -> bool {
        ProjectPaths::new(root.to_path_buf()).manifest_path().is_file()
    }

    /// Create the directory layout and an initial manifest. Fails if a
    /// manifest is already present.
    pub fn create(
        root: &Path,
        project_type: ProjectType,
        extra: &[(String, MetaValue)],
    ) -> Result<Self> {
        let paths = ProjectPaths::new(absolute(root)?);
        if paths.manifest_path().is_file() {
            return Err(anyhow!(
                "project already exists: {}",
                paths.root().display()
            ));
        }
        for dir in [paths.metadata_dir(), paths.data_dir(), paths.daemon_dir()] {
            fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        }

        let mut metadata = MetadataStore::empty(paths.manifest_path());
        let name = paths
            .root()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        metadata.set("name", name)?;
        metadata.set(TYPE_KEY, project_type.as_str())?;
        for (key, value) in extra {
            metadata.set(key, value.clone())?;
        }
        metadata.save()?;
        tracing::info!(root = %paths.root().display(), project_type = %project_type, "created project");

        Ok(Self {
            paths,
            project_type,
            metadata,
        })
    }

    pub fn load(root: &Path) -> Result<Self> {
        let paths = ProjectPaths::new(absolute(root)?);
        let manifest = paths.manifest_path();
        if !manifest.is_file() {
            return Err(PipelineError::LoadFailure {
                what: "project",
                path: paths.root().to_path_buf(),
            }
            .into());
        }
        let metadata = MetadataStore::open(manifest);
        let declared = metadata.text(TYPE_KEY)?.unwrap_or_default();
        let project_type = declared.parse::<ProjectType>()?;
        Ok(Self {
            paths,
            project_type,
            metadata,
        })
    }

    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn project_type(&self) -> ProjectType {
        self.project_type
    }

    #[cfg(test)]
    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataStore {
        &mut self.metadata
    }

    /// Dataset names in sorted order, one per `metadata/<name>.json`.
    pub fn dataset_names(&self) -> Result<Vec<String>> {
        let dir = self.paths.metadata_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("read {}", dir.display()))? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn datasets(&self) -> Result<Vec<Dataset>> {
        Ok(self
            .dataset_names()?
            .iter()
            .map(|name| Dataset::open(&self.paths, name))
            .collect())
    }

    pub fn has_dataset(&self, name: &str) -> bool {
        self.paths.dataset_metadata_path(name).is_file()
    }

    pub fn dataset(&self, name: &str) -> Option<Dataset> {
        self.has_dataset(name)
            .then(|| Dataset::open(&self.paths, name))
    }

    /// Register and save a new dataset. Returns `None` when the name is
    /// already taken; the existing dataset is left untouched.
    pub fn register_dataset(
        &self,
        name: &str,
        kind: DatasetType,
        extra: &[(String, MetaValue)],
    ) -> Result<Option<Dataset>> {
        if !is_valid_name(name) {
            return Err(anyhow!(
                "invalid dataset name {name:?} (expected [A-Za-z0-9_]+)"
            ));
        }
        if self.has_dataset(name) {
            return Ok(None);
        }
        let mut dataset = Dataset::fresh(&self.paths, name, kind)?;
        for (key, value) in extra {
            dataset.metadata_mut().set(key, value.clone())?;
        }
        dataset.save()?;
        tracing::debug!(dataset = name, dataset_type = %kind, "registered dataset");
        Ok(Some(dataset))
    }

    #[cfg(test)]
    pub fn save(&mut self) -> Result<()> {
        self.metadata.save()
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
