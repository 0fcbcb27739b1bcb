use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::{QueryError, QueryResult};
use super::normalize::Slot;
use super::types::MetaQuery;
use crate::constants::DEFAULT_MAX_PATTERNS_PER_PREDICATE;
use crate::fact::{Fact, PatternStore};

/// Turns a fact plus its predicate's patterns into search queries.
#[derive(Debug, Clone)]
pub struct QueryGenerator {
    patterns: Arc<PatternStore>,
    max_patterns: usize,
}

impl QueryGenerator {
    pub fn new(patterns: Arc<PatternStore>) -> Self {
        Self {
            patterns,
            max_patterns: DEFAULT_MAX_PATTERNS_PER_PREDICATE,
        }
    }

    pub fn with_max_patterns(mut self, max_patterns: usize) -> Self {
        self.max_patterns = max_patterns;
        self
    }

    pub fn patterns(&self) -> &PatternStore {
        &self.patterns
    }

    /// One query per matching pattern for `language`, highest naturalness first.
    ///
    /// Queries with the same raw text are collapsed onto the most natural
    /// pattern; on equal naturalness the earlier-mined pattern wins.
    pub fn generate_queries(&self, fact: &Fact, language: &str) -> QueryResult<Vec<MetaQuery>> {
        if !fact.declares_language(language) {
            return Err(QueryError::UndeclaredLanguage {
                language: language.to_string(),
            });
        }

        let labels = fact.labels(language);
        let subject = labels.map(|l| l.subject.trim()).unwrap_or_default();
        let object = labels.map(|l| l.object.trim()).unwrap_or_default();

        if subject.is_empty() {
            return Err(QueryError::EmptyLabel {
                language: language.to_string(),
                slot: Slot::Subject,
            });
        }
        if object.is_empty() {
            return Err(QueryError::EmptyLabel {
                language: language.to_string(),
                slot: Slot::Object,
            });
        }

        let candidates =
            self.patterns
                .top_patterns(fact.predicate_uri(), language, self.max_patterns);

        let mut seen = HashSet::with_capacity(candidates.len());
        let mut queries = Vec::with_capacity(candidates.len());
        for pattern in candidates {
            let query = MetaQuery::build(pattern, subject, object);
            if query.raw_query.is_empty() || !seen.insert(query.raw_query.clone()) {
                continue;
            }
            queries.push(query);
        }

        debug!(
            language = language,
            predicate = fact.predicate_uri(),
            queries = queries.len(),
            "Generated search queries"
        );

        Ok(queries)
    }

    /// Queries for every declared language; languages without labels are skipped.
    pub fn generate_all(&self, fact: &Fact) -> Vec<MetaQuery> {
        let mut queries = Vec::new();
        for language in fact.languages() {
            match self.generate_queries(fact, language) {
                Ok(batch) => queries.extend(batch),
                Err(e) => warn!(fact = %fact, language = language, error = %e, "Skipping language"),
            }
        }
        queries
    }
}
