use std::path::PathBuf;
use thiserror::Error;

/// Failures loading a trained model artifact. Fatal at startup.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model not found at path: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read model {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

pub type ModelResult<T> = Result<T, ModelError>;
