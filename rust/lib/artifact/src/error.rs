use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("cannot read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    Invalid(String),

    #[error("shape mismatch: expected {expected} values, got {actual}")]
    Shape { expected: usize, actual: usize },

    #[error("non-finite output: {0}")]
    NonFinite(f64),
}
