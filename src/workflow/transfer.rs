//! Metadata transfer: mark an entity as needing (re)processing.
use crate::model::{MetaValue, MetadataStore};
use anyhow::Result;

/// Clear every `run_*` counter and the `ref_project` link, apply `fresh`,
/// count one attempt for each of `stages`, then save.
pub fn transfer(
    store: &mut MetadataStore,
    fresh: &[(String, MetaValue)],
    stages: &[&str],
) -> Result<()> {
    let cleared = store.reset_progress()?;
    for (key, value) in fresh {
        store.set(key, value.clone())?;
    }
    for stage in stages {
        store.bump_run(stage)?;
    }
    store.save()?;
    tracing::debug!(
        path = %store.path().display(),
        cleared = cleared.len(),
        applied = fresh.len(),
        "metadata transfer"
    );
    Ok(())
}
