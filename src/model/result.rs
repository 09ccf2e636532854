//! Read-only view of analysis results written by the daemon.
use super::paths::ProjectPaths;
use super::types::ResultKind;
use crate::util::read_json;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One stat: either a bare value or a `[value, unit]` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    WithUnit(serde_json::Value, String),
    Plain(serde_json::Value),
}

impl StatValue {
    pub fn value(&self) -> &serde_json::Value {
        match self {
            StatValue::WithUnit(value, _) | StatValue::Plain(value) => value,
        }
    }
}

impl fmt::Display for StatValue {
    /// Renders the value only; strings are printed without quotes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            serde_json::Value::String(text) => f.write_str(text),
            serde_json::Value::Null => Ok(()),
            other => write!(f, "{other}"),
        }
    }
}

/// On-disk result; the `files` map is the daemon's business and is skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ResultDocument {
    #[serde(default)]
    stats: BTreeMap<String, StatValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    stats: Vec<(String, StatValue)>,
}

impl AnalysisResult {
    /// Load `data/<kind>/<owner>.json`; `None` when the daemon has not
    /// produced it yet.
    pub fn load(paths: &ProjectPaths, kind: ResultKind, owner: &str) -> Result<Option<Self>> {
        let path = paths.result_path(kind, owner);
        if !path.is_file() {
            return Ok(None);
        }
        let document: ResultDocument = read_json(&path)?;
        Ok(Some(Self {
            stats: document.stats.into_iter().collect(),
        }))
    }

    /// Metrics in key order.
    pub fn stats(&self) -> &[(String, StatValue)] {
        &self.stats
    }

    pub fn stat(&self, metric: &str) -> Option<&StatValue> {
        self.stats
            .iter()
            .find(|(name, _)| name == metric)
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalysisResult, StatValue};
    use crate::model::paths::ProjectPaths;
    use crate::model::types::ResultKind;

    #[test]
    fn stats_keep_units_in_metric_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = ProjectPaths::new(dir.path().to_path_buf());
        let path = paths.result_path(ResultKind::Assembly, "E_coli");
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(
            &path,
            r#"{"files":{"fasta":"E_coli.LargeContigs.fna"},
                "stats":{"total_length":[4641652,"bp"],"n50":[120000,"bp"],"contigs":54}}"#,
        )
        .expect("write result");

        let result = AnalysisResult::load(&paths, ResultKind::Assembly, "E_coli")
            .expect("load")
            .expect("present");
        let metrics: Vec<&str> = result.stats().iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(metrics, vec!["contigs", "n50", "total_length"]);
        assert!(matches!(
            result.stat("total_length"),
            Some(StatValue::WithUnit(_, unit)) if unit == "bp"
        ));
        assert_eq!(result.stat("total_length").expect("length").to_string(), "4641652");
        assert_eq!(result.stat("contigs").expect("contigs").to_string(), "54");

        assert!(AnalysisResult::load(&paths, ResultKind::Cds, "E_coli")
            .expect("load")
            .is_none());
    }
}
