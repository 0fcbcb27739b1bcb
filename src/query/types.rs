use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::normalize::{normalize_predicate, normalize_query_key, render_query};
use crate::fact::Pattern;

/// A concrete search query for one (pattern, language) pair of a fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaQuery {
    pub language: String,
    pub subject_label: String,
    pub object_label: String,
    /// Normalized predicate text of the pattern (empty for sentinel patterns).
    pub predicate_label: String,
    pub pattern: Arc<Pattern>,
    pub raw_query: String,
}

impl MetaQuery {
    /// Builds the query by substituting labels into the pattern template.
    pub fn build(
        pattern: Arc<Pattern>,
        subject_label: impl Into<String>,
        object_label: impl Into<String>,
    ) -> Self {
        let subject_label = subject_label.into();
        let object_label = object_label.into();
        let raw_query = render_query(pattern.template(), &subject_label, &object_label);
        let predicate_label = normalize_predicate(pattern.template());

        Self {
            language: pattern.language().to_string(),
            subject_label,
            object_label,
            predicate_label,
            pattern,
            raw_query,
        }
    }

    /// Cache-key form of [`Self::raw_query`].
    pub fn normalized_query(&self) -> String {
        normalize_query_key(&self.raw_query)
    }
}

impl fmt::Display for MetaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.language, self.raw_query)
    }
}
