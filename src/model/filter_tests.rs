use super::{load_and_filter, DatasetFilter};
use crate::model::metadata::MetaValue;
use crate::model::project::Project;
use crate::model::taxonomy::Taxonomy;
use crate::model::types::{DatasetType, ProjectType};
use crate::params::Params;

fn names(project: &Project, filter: &DatasetFilter) -> Vec<String> {
    load_and_filter(project, filter)
        .expect("filter")
        .iter()
        .map(|dataset| dataset.name().to_string())
        .collect()
}

fn pair(key: &str, value: MetaValue) -> (String, MetaValue) {
    (key.to_string(), value)
}

/// Four datasets covering every combination the filters branch on.
fn fixture(dir: &tempfile::TempDir) -> Project {
    let project = Project::create(dir.path(), ProjectType::Mixed, &[]).expect("create");
    project
        .register_dataset(
            "A_genome",
            DatasetType::Genome,
            &[pair("tax", MetaValue::from("d:Bacteria g:Escherichia"))],
        )
        .expect("register");
    project
        .register_dataset(
            "B_query",
            DatasetType::Genome,
            &[
                pair("ref", MetaValue::Bool(false)),
                pair("tax", MetaValue::from("d:Bacteria g:Salmonella")),
            ],
        )
        .expect("register");
    project
        .register_dataset(
            "C_meta",
            DatasetType::Metagenome,
            &[pair("tax", MetaValue::from("d:Bacteria"))],
        )
        .expect("register");
    project
        .register_dataset(
            "D_off",
            DatasetType::Genome,
            &[
                pair("inactive", MetaValue::Bool(true)),
                pair("tax", MetaValue::from("d:Bacteria g:Escherichia")),
            ],
        )
        .expect("register");
    project
}

#[test]
fn empty_filter_lists_everything_in_name_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let project = fixture(&dir);
    assert_eq!(
        names(&project, &DatasetFilter::default()),
        vec!["A_genome", "B_query", "C_meta", "D_off"]
    );
}

#[test]
fn boolean_criteria_narrow_the_candidates() {
    let dir = tempfile::tempdir().expect("temp dir");
    let project = fixture(&dir);

    let reference = DatasetFilter {
        reference: Some(true),
        ..DatasetFilter::default()
    };
    assert_eq!(names(&project, &reference), vec!["A_genome", "C_meta", "D_off"]);

    let active_ref = DatasetFilter::reference_and_active();
    assert_eq!(names(&project, &active_ref), vec!["A_genome", "C_meta"]);

    let multi = DatasetFilter {
        multi: Some(true),
        ..DatasetFilter::default()
    };
    assert_eq!(names(&project, &multi), vec!["C_meta"]);

    let nonmulti = DatasetFilter {
        multi: Some(false),
        ..DatasetFilter::default()
    };
    assert_eq!(names(&project, &nonmulti), vec!["A_genome", "B_query", "D_off"]);

    let taxon = DatasetFilter {
        taxonomy: Some(Taxonomy::parse("g:Escherichia")),
        ..DatasetFilter::default()
    };
    assert_eq!(names(&project, &taxon), vec!["A_genome", "D_off"]);
}

#[test]
fn adding_criteria_never_grows_the_result() {
    let dir = tempfile::tempdir().expect("temp dir");
    let project = fixture(&dir);

    let steps = [
        DatasetFilter::default(),
        DatasetFilter {
            reference: Some(true),
            ..DatasetFilter::default()
        },
        DatasetFilter {
            reference: Some(true),
            active: Some(true),
            ..DatasetFilter::default()
        },
        DatasetFilter {
            reference: Some(true),
            active: Some(true),
            multi: Some(false),
            ..DatasetFilter::default()
        },
        DatasetFilter {
            reference: Some(true),
            active: Some(true),
            multi: Some(false),
            taxonomy: Some(Taxonomy::parse("d:Bacteria")),
            ..DatasetFilter::default()
        },
    ];
    let mut previous: Option<Vec<String>> = None;
    for filter in &steps {
        let current = names(&project, filter);
        if let Some(previous) = &previous {
            assert!(current.iter().all(|name| previous.contains(name)));
        }
        previous = Some(current);
    }
}

#[test]
fn index_applies_after_boolean_criteria() {
    let dir = tempfile::tempdir().expect("temp dir");
    let project = fixture(&dir);

    let base = DatasetFilter::reference_and_active();
    let full = names(&project, &base);
    for k in 1..=3 {
        let indexed = DatasetFilter {
            index: Some(k),
            ..base.clone()
        };
        let picked = names(&project, &indexed);
        assert!(picked.len() <= 1);
        assert!(picked.iter().all(|name| full.contains(name)));
    }
    let second = DatasetFilter {
        index: Some(2),
        ..base
    };
    assert_eq!(names(&project, &second), vec!["C_meta"]);
}

#[test]
fn named_dataset_missing_is_empty_unless_strict() {
    let dir = tempfile::tempdir().expect("temp dir");
    let project = fixture(&dir);

    let mut filter = DatasetFilter {
        dataset: Some("Z_missing".to_string()),
        ..DatasetFilter::default()
    };
    assert!(names(&project, &filter).is_empty());

    filter.strict = true;
    assert!(load_and_filter(&project, &filter).is_err());

    let named = DatasetFilter {
        dataset: Some("B_query".to_string()),
        reference: Some(true),
        ..DatasetFilter::default()
    };
    assert!(names(&project, &named).is_empty());
}

#[test]
fn from_params_reads_listing_options() {
    let mut params = Params::new();
    params.set("ref", false);
    params.set("taxonomy", "g:Escherichia");
    params.set("dataset_k", 2_i64);
    let filter = DatasetFilter::from_params(&params).expect("filter");
    assert_eq!(filter.reference, Some(false));
    assert_eq!(filter.active, None);
    assert_eq!(filter.index, Some(2));
    assert_eq!(filter.taxonomy, Some(Taxonomy::parse("g:Escherichia")));

    params.set("dataset_k", 0_i64);
    assert!(DatasetFilter::from_params(&params).is_err());
}
