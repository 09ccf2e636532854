//! Typed paths into a project layout.
//!
//! Centralizing path construction keeps the stages and the cleanup set in
//! agreement about what lives where.
use super::types::ResultKind;
use std::path::{Path, PathBuf};

/// Project manifest file name (the project-level metadata document).
pub const MANIFEST_FILE: &str = "project.json";

#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the `project.json` manifest path.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Return the `metadata/` directory path.
    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join("metadata")
    }

    /// Return the `metadata/<dataset>.json` path.
    pub fn dataset_metadata_path(&self, name: &str) -> PathBuf {
        self.metadata_dir().join(format!("{name}.json"))
    }

    /// Return the `data/` directory path.
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    /// Return the `data/inputs/` directory holding ingested files.
    pub fn inputs_dir(&self) -> PathBuf {
        self.data_dir().join("inputs")
    }

    /// Return the `data/downloads/` directory holding fetched records.
    pub fn downloads_dir(&self) -> PathBuf {
        self.data_dir().join("downloads")
    }

    /// Return the `data/<category>/` result directory.
    pub fn result_dir(&self, kind: ResultKind) -> PathBuf {
        self.data_dir().join(kind.as_str())
    }

    /// Return the `data/<category>/<owner>.json` result descriptor path.
    pub fn result_path(&self, kind: ResultKind, owner: &str) -> PathBuf {
        self.result_dir(kind).join(format!("{owner}.json"))
    }

    /// Return the `daemon/` working directory path.
    pub fn daemon_dir(&self) -> PathBuf {
        self.root.join("daemon")
    }

    /// Return the `<category>.tsv` summary path.
    pub fn summary_path(&self, kind: ResultKind) -> PathBuf {
        self.root.join(format!("{}.tsv", kind.as_str()))
    }

    /// The only paths cleanup is allowed to remove.
    pub fn cleanup_targets(&self) -> [PathBuf; 4] {
        [
            self.data_dir(),
            self.daemon_dir(),
            self.metadata_dir(),
            self.manifest_path(),
        ]
    }
}
