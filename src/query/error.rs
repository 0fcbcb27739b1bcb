use thiserror::Error;

use super::normalize::Slot;

/// Per-language query generation failures. Callers skip the language.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("missing {slot} label for language '{language}'")]
    EmptyLabel { language: String, slot: Slot },

    #[error("language '{language}' is not declared by the fact")]
    UndeclaredLanguage { language: String },
}

pub type QueryResult<T> = Result<T, QueryError>;
