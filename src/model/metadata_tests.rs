use super::{parse_metadata_pairs, MetaValue, MetadataStore};
use crate::error::{pipeline_error, PipelineError};

fn temp_store_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
    dir.path().join("metadata").join("E_coli.json")
}

#[test]
fn assigning_unset_deletes_the_key() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = MetadataStore::empty(temp_store_path(&dir));
    store.set("tax", "g:Escherichia").expect("set");
    assert_eq!(store.text("tax").expect("read"), Some("g:Escherichia"));

    store.set("tax", MetaValue::Unset).expect("unset");
    assert_eq!(store.get("tax").expect("read"), None);

    store.set("quality", "high").expect("set");
    assert_eq!(
        store.delete("quality").expect("delete"),
        Some(MetaValue::Text("high".to_string()))
    );
    assert!(store.keys().expect("keys").is_empty());
}

#[test]
fn save_persists_typed_values_and_stamps() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_store_path(&dir);
    let mut store = MetadataStore::empty(path.clone());
    store.set("ref", true).expect("set");
    store.set("run_ingest", 2_i64).expect("set");
    store.set("type", "genome").expect("set");
    store.set("completeness", MetaValue::Float(97.5)).expect("set");
    store.save().expect("save");

    let reloaded = MetadataStore::open(path);
    assert_eq!(reloaded.flag("ref").expect("read"), Some(true));
    assert_eq!(reloaded.run_count("ingest").expect("read"), 2);
    assert_eq!(reloaded.text("type").expect("read"), Some("genome"));
    assert_eq!(
        reloaded.get("completeness").expect("read"),
        Some(&MetaValue::Float(97.5))
    );
    assert!(reloaded.get("created").expect("read").is_some());
    assert!(reloaded.get("updated").expect("read").is_some());
}

#[test]
fn unsaved_mutations_are_not_durable() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_store_path(&dir);
    let mut store = MetadataStore::empty(path.clone());
    store.set("type", "genome").expect("set");
    store.save().expect("save");

    store.set("tax", "s:Escherichia_coli").expect("set");
    let reloaded = MetadataStore::open(path);
    assert_eq!(reloaded.text("tax").expect("read"), None);
}

#[test]
fn first_access_of_a_missing_file_is_a_load_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = MetadataStore::open(temp_store_path(&dir));
    let err = store.get("type").expect_err("file does not exist");
    assert!(matches!(
        pipeline_error(&err),
        Some(PipelineError::LoadFailure { what: "metadata", .. })
    ));
}

#[test]
fn reset_progress_clears_counters_and_provenance_only() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = MetadataStore::empty(temp_store_path(&dir));
    store.set("run_ingest", 3_i64).expect("set");
    store.set("run_analysis", 1_i64).expect("set");
    store.set("ref_project", "/data/source").expect("set");
    store.set("type", "genome").expect("set");
    store.set("runtime", "fast").expect("set");

    let mut removed = store.reset_progress().expect("reset");
    removed.sort();
    assert_eq!(removed, vec!["ref_project", "run_analysis", "run_ingest"]);
    assert_eq!(store.keys().expect("keys"), vec!["runtime", "type"]);

    assert_eq!(store.bump_run("ingest").expect("bump"), 1);
    assert_eq!(store.bump_run("ingest").expect("bump"), 2);
}

#[test]
fn metadata_pairs_parse_literals() {
    let pairs = parse_metadata_pairs("ref=false, min_qual=25,ratio=0.5,tax=g:Escherichia,old=nil")
        .expect("parse");
    assert_eq!(
        pairs,
        vec![
            ("ref".to_string(), MetaValue::Bool(false)),
            ("min_qual".to_string(), MetaValue::Integer(25)),
            ("ratio".to_string(), MetaValue::Float(0.5)),
            ("tax".to_string(), MetaValue::Text("g:Escherichia".to_string())),
            ("old".to_string(), MetaValue::Unset),
        ]
    );
    assert!(parse_metadata_pairs("novalue").is_err());
    assert!(parse_metadata_pairs("=x").is_err());
}

#[test]
fn non_finite_literals_stay_text_across_save() {
    let pairs = parse_metadata_pairs("note=inf,other=NaN,big=1e400,ok=2.5").expect("parse");
    assert_eq!(pairs[0].1, MetaValue::Text("inf".to_string()));
    assert_eq!(pairs[1].1, MetaValue::Text("NaN".to_string()));
    assert_eq!(pairs[2].1, MetaValue::Text("1e400".to_string()));
    assert_eq!(pairs[3].1, MetaValue::Float(2.5));

    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_store_path(&dir);
    let mut store = MetadataStore::empty(path.clone());
    for (key, value) in pairs {
        store.set(&key, value).expect("set");
    }
    store.save().expect("save");

    let reloaded = MetadataStore::open(path);
    assert_eq!(reloaded.text("note").expect("read"), Some("inf"));
    assert_eq!(reloaded.text("other").expect("read"), Some("NaN"));
    assert_eq!(reloaded.text("big").expect("read"), Some("1e400"));
}
