use std::path::PathBuf;
use thiserror::Error;

/// Environment-level failures that abort a run.
///
/// Everything recoverable (unexpected filenames, missing metadata files,
/// unreadable header lines, ambiguous relation clauses, …) is collected as
/// a [`crate::report::Diagnostic`] instead and never surfaces here.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot read corpus root {path}: {source}")]
    CorpusRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed relation-type table {path}, line {line}: {reason}")]
    RelationTable {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("cannot write output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
