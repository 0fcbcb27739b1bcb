use std::path::PathBuf;
use thiserror::Error;

/// Failures loading the pattern inventory. Fatal at startup.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern inventory not found at {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read pattern inventory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pattern inventory {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type PatternResult<T> = Result<T, PatternError>;
