use std::path::PathBuf;

use thiserror::Error;

/// A record cannot be turned into a feature vector.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeatureError {
    #[error("account '{username}' is missing required feature {field}")]
    Missing {
        username: String,
        field: &'static str,
    },

    #[error("account '{username}' has invalid value {value} for feature {field}")]
    Invalid {
        username: String,
        field: &'static str,
        value: i64,
    },
}

/// Training failed; the process must not serve without a fitted ensemble.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset {context}: {source}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid row in dataset {context} (record {record}): {reason}")]
    InvalidRow {
        context: String,
        record: u64,
        reason: String,
    },

    #[error("training corpus is empty")]
    EmptyCorpus,

    #[error("training corpus has no {0} samples; both classes are required")]
    MissingClass(&'static str),
}
