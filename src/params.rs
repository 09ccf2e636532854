//! Resolved parameters for one invocation.
//!
//! Explicit values shadow declared defaults; lookups never fail, so callers
//! decide what "absent" means and call `require` before anything that would
//! corrupt later stages.
use crate::error::PipelineError;
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    Flag(bool),
    List(Vec<String>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(value) => f.write_str(value),
            ParamValue::Int(value) => write!(f, "{value}"),
            ParamValue::Flag(value) => write!(f, "{value}"),
            ParamValue::List(values) => f.write_str(&values.join(",")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Flag(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

/// Parameter store: explicit values, declared defaults, trailing files and the
/// optional leading operation verb.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
    defaults: BTreeMap<String, ParamValue>,
    files: Vec<PathBuf>,
    operation: Option<String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults<I, K>(defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, ParamValue)>,
        K: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in defaults {
            params.defaults.insert(key.into(), value);
        }
        params
    }

    /// Explicit value, else declared default, else `None`.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key).or_else(|| self.defaults.get(key))
    }

    /// Overwrite a value for the current invocation only.
    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Fail on the first key (in mapping order) that resolves to nothing,
    /// naming the flag that should have supplied it.
    pub fn require(&self, required: &[(&str, &str)]) -> Result<(), PipelineError> {
        for (key, flag) in required {
            if !self.is_set(key) {
                return Err(PipelineError::missing(key, flag));
            }
        }
        Ok(())
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(ParamValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn path(&self, key: &str) -> Option<PathBuf> {
        self.text(key).map(PathBuf::from)
    }

    pub fn int(&self, key: &str) -> Result<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(ParamValue::Int(value)) => Ok(Some(*value)),
            Some(ParamValue::Text(raw)) => raw
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| anyhow!("{key} must be an integer (got {raw:?})")),
            Some(other) => Err(anyhow!("{key} must be an integer (got {other})")),
        }
    }

    /// Non-negative integer narrowed to `u32`.
    pub fn count(&self, key: &str) -> Result<Option<u32>> {
        match self.int(key)? {
            None => Ok(None),
            Some(value) => u32::try_from(value)
                .map(Some)
                .map_err(|_| anyhow!("{key} must be a non-negative integer (got {value})")),
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(ParamValue::Flag(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(ParamValue::List(values)) => values.clone(),
            Some(ParamValue::Text(value)) => vec![value.clone()],
            _ => Vec::new(),
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn set_files(&mut self, files: Vec<PathBuf>) {
        self.files = files;
    }

    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    pub fn set_operation(&mut self, operation: Option<String>) {
        self.operation = operation;
    }
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
