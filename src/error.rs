//! Typed failure kinds surfaced at the dispatch boundary.
//!
//! Everything else travels as `anyhow::Error` with context; these variants are
//! the ones callers branch on (exit codes, tests, stage bookkeeping).
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A mandatory parameter was neither passed nor defaulted.
    #[error("{key} is mandatory: please provide {flag}")]
    MissingParameter { key: String, flag: String },

    /// A declared type is not part of its static registry.
    #[error("unrecognized {kind} type: {value}")]
    UnknownType { kind: &'static str, value: String },

    /// The task verb matched neither an alias nor a registered action.
    #[error("no action set for {task:?} (see `genoflow generic`)")]
    NoAction { task: String },

    #[error("cannot load {what}: {}", path.display())]
    LoadFailure { what: &'static str, path: PathBuf },

    /// A workflow stage (or the daemon behind it) returned failure.
    #[error("stage {stage} failed")]
    StageExecution {
        stage: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl PipelineError {
    pub fn missing(key: &str, flag: &str) -> Self {
        PipelineError::MissingParameter {
            key: key.to_string(),
            flag: flag.to_string(),
        }
    }

    pub fn stage(stage: &'static str, source: anyhow::Error) -> Self {
        PipelineError::StageExecution {
            stage,
            source: source.into(),
        }
    }
}

/// Find the outermost `PipelineError` anywhere in an error's cause chain.
pub fn pipeline_error(err: &anyhow::Error) -> Option<&PipelineError> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PipelineError>())
}
