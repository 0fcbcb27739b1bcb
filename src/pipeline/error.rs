use thiserror::Error;

use crate::config::ConfigError;
use crate::fact::PatternError;
use crate::scoring::ModelError;
use crate::search::BackendError;

/// Startup failures. Once a checker is built, checking a fact never fails.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("pattern inventory error: {0}")]
    Patterns(#[from] PatternError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("search backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("fact checker is missing its {name}")]
    MissingComponent { name: &'static str },
}

pub type PipelineResult<T> = Result<T, PipelineError>;
