use crate::model::ProjectPaths;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Remove the intermediate project layout, leaving summaries and anything
/// else under the root in place. Returns the paths that were removed.
pub fn remove_intermediates(paths: &ProjectPaths) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for target in paths.cleanup_targets() {
        if target.is_dir() {
            fs::remove_dir_all(&target)
                .with_context(|| format!("remove {}", target.display()))?;
        } else if target.is_file() {
            fs::remove_file(&target).with_context(|| format!("remove {}", target.display()))?;
        } else {
            continue;
        }
        removed.push(target);
    }
    Ok(removed)
}
