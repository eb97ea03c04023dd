use std::{io, path::PathBuf};

use thiserror::Error;

use crate::record::RecordError;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("cannot read parameter directory {path:?}: {source}")]
    BucketDir { path: PathBuf, source: io::Error },

    #[error("cannot read results file {path:?}: {source}")]
    ResultsFile { path: PathBuf, source: io::Error },

    #[error("malformed results file {path:?}: {source}")]
    Record { path: PathBuf, source: RecordError },

    #[error("cannot write {path:?}: {source}")]
    Output { path: PathBuf, source: io::Error },

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StatsError>;
