//! Persisted key→scalar documents attached to projects and datasets.
//!
//! The backing file is read on first access and rewritten atomically by
//! `save`; mutations that are never saved are lost with the process.
use crate::error::PipelineError;
use crate::util::{now_timestamp, read_json, write_json_atomic};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix of the per-stage attempt counters.
pub const RUN_PREFIX: &str = "run_";
/// Provenance link to a source project.
pub const REF_PROJECT_KEY: &str = "ref_project";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Assigning `Unset` deletes the key; it is never persisted.
    Unset,
}

impl MetaValue {
    /// Interpret a `key=value` literal from the command line.
    pub fn parse_literal(raw: &str) -> Self {
        match raw {
            "true" => MetaValue::Bool(true),
            "false" => MetaValue::Bool(false),
            "nil" => MetaValue::Unset,
            _ => {
                if let Ok(value) = raw.parse::<i64>() {
                    MetaValue::Integer(value)
                } else if let Some(value) = raw.parse::<f64>().ok().filter(|value| value.is_finite()) {
                    MetaValue::Float(value)
                } else {
                    MetaValue::Text(raw.to_string())
                }
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetaValue::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Bool(value) => write!(f, "{value}"),
            MetaValue::Integer(value) => write!(f, "{value}"),
            MetaValue::Float(value) => write!(f, "{value}"),
            MetaValue::Text(value) => f.write_str(value),
            MetaValue::Unset => Ok(()),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Integer(value)
    }
}

/// Parse a comma-separated `key=value` list (e.g. `-m tax=g:Escherichia,ref=false`).
pub fn parse_metadata_pairs(raw: &str) -> Result<Vec<(String, MetaValue)>> {
    let mut pairs = Vec::new();
    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid metadata pair {pair:?} (expected key=value)"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(anyhow!("invalid metadata pair {pair:?} (empty key)"));
        }
        pairs.push((key.to_string(), MetaValue::parse_literal(value.trim())));
    }
    Ok(pairs)
}

#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
    entries: OnceCell<BTreeMap<String, MetaValue>>,
}

impl MetadataStore {
    /// Store backed by an existing file; nothing is read until first access.
    pub fn open(path: PathBuf) -> Self {
        Self {
            path,
            entries: OnceCell::new(),
        }
    }

    /// Fresh in-memory store for an entity that has not been persisted yet.
    pub fn empty(path: PathBuf) -> Self {
        Self {
            path,
            entries: OnceCell::from(BTreeMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> Result<&BTreeMap<String, MetaValue>> {
        if let Some(entries) = self.entries.get() {
            return Ok(entries);
        }
        let loaded = read_document(&self.path)?;
        Ok(self.entries.get_or_init(|| loaded))
    }

    fn entries_mut(&mut self) -> Result<&mut BTreeMap<String, MetaValue>> {
        if self.entries.get().is_none() {
            let loaded = read_document(&self.path)?;
            let _ = self.entries.set(loaded);
        }
        self.entries
            .get_mut()
            .ok_or_else(|| anyhow!("metadata {} not loaded", self.path.display()))
    }

    pub fn get(&self, key: &str) -> Result<Option<&MetaValue>> {
        Ok(self.entries()?.get(key))
    }

    pub fn text(&self, key: &str) -> Result<Option<&str>> {
        Ok(self.get(key)?.and_then(MetaValue::as_str))
    }

    pub fn flag(&self, key: &str) -> Result<Option<bool>> {
        Ok(self.get(key)?.and_then(MetaValue::as_bool))
    }

    /// Assign a value; `MetaValue::Unset` removes the key instead.
    pub fn set(&mut self, key: &str, value: impl Into<MetaValue>) -> Result<()> {
        let value = value.into();
        if value == MetaValue::Unset {
            self.delete(key)?;
        } else {
            self.entries_mut()?.insert(key.to_string(), value);
        }
        Ok(())
    }

    pub fn delete(&mut self, key: &str) -> Result<Option<MetaValue>> {
        Ok(self.entries_mut()?.remove(key))
    }

    #[cfg(test)]
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.keys().cloned().collect())
    }

    /// Attempt counter for `stage` (0 when never applied).
    pub fn run_count(&self, stage: &str) -> Result<i64> {
        let key = format!("{RUN_PREFIX}{stage}");
        Ok(self.get(&key)?.and_then(MetaValue::as_i64).unwrap_or(0))
    }

    /// Increment the attempt counter for `stage`, returning the new value.
    pub fn bump_run(&mut self, stage: &str) -> Result<i64> {
        let next = self.run_count(stage)? + 1;
        self.set(&format!("{RUN_PREFIX}{stage}"), next)?;
        Ok(next)
    }

    /// Drop every `run_*` counter and the `ref_project` link so the entity
    /// reads as "needs reprocessing". Returns the removed keys.
    pub fn reset_progress(&mut self) -> Result<Vec<String>> {
        let entries = self.entries_mut()?;
        let stale: Vec<String> = entries
            .keys()
            .filter(|key| key.starts_with(RUN_PREFIX) || key.as_str() == REF_PROJECT_KEY)
            .cloned()
            .collect();
        for key in &stale {
            entries.remove(key);
        }
        Ok(stale)
    }

    /// Stamp and persist the document.
    pub fn save(&mut self) -> Result<()> {
        let now = now_timestamp();
        let path = self.path.clone();
        let entries = self.entries_mut()?;
        entries
            .entry("created".to_string())
            .or_insert_with(|| MetaValue::Text(now.clone()));
        entries.insert("updated".to_string(), MetaValue::Text(now));
        write_json_atomic(&path, entries)
            .with_context(|| format!("save metadata {}", path.display()))
    }
}

fn read_document(path: &Path) -> Result<BTreeMap<String, MetaValue>> {
    if !path.is_file() {
        return Err(PipelineError::LoadFailure {
            what: "metadata",
            path: path.to_path_buf(),
        }
        .into());
    }
    let mut entries: BTreeMap<String, MetaValue> = read_json(path)?;
    entries.retain(|_, value| *value != MetaValue::Unset);
    Ok(entries)
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
