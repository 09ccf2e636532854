//! Persisted project/dataset model.
pub mod dataset;
pub mod filter;
pub mod metadata;
pub mod paths;
pub mod project;
pub mod result;
pub mod taxonomy;
pub mod types;

pub use dataset::Dataset;
pub use filter::{load_and_filter, DatasetFilter};
pub use metadata::{parse_metadata_pairs, MetaValue, MetadataStore};
pub use paths::ProjectPaths;
pub use project::Project;
pub use types::{DatasetType, ProjectType, ResultKind};
