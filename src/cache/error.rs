use std::path::PathBuf;
use thiserror::Error;

/// Snapshot persistence failures. Never fatal for a crawl.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("snapshot I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to parse snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported snapshot version {version} in {path}")]
    UnsupportedVersion { path: PathBuf, version: u32 },
}

pub type CacheResult<T> = Result<T, CacheError>;
