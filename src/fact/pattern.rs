use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::error::{PatternError, PatternResult};
use crate::constants::NO_PREDICATE_SENTINEL;
use crate::hashing::hash_pattern_id;

/// Serialized form of a [`Pattern`] (inventory files, cache snapshots).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PatternRecord {
    language: String,
    predicate: String,
    template: String,
    naturalness: f64,
}

/// A scored lexical template expressing a predicate in one language.
///
/// `?D?` marks the subject slot and `?R?` the object slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PatternRecord", into = "PatternRecord")]
pub struct Pattern {
    id: u64,
    language: String,
    predicate_uri: String,
    template: String,
    naturalness: f64,
}

impl From<PatternRecord> for Pattern {
    fn from(record: PatternRecord) -> Self {
        Pattern::new(
            record.language,
            record.predicate,
            record.template,
            record.naturalness,
        )
    }
}

impl From<Pattern> for PatternRecord {
    fn from(pattern: Pattern) -> Self {
        PatternRecord {
            language: pattern.language,
            predicate: pattern.predicate_uri,
            template: pattern.template,
            naturalness: pattern.naturalness,
        }
    }
}

impl Pattern {
    pub fn new(
        language: impl Into<String>,
        predicate_uri: impl Into<String>,
        template: impl Into<String>,
        naturalness: f64,
    ) -> Self {
        let language = language.into();
        let predicate_uri = predicate_uri.into();
        let template = template.into();
        let naturalness = if naturalness.is_finite() {
            naturalness
        } else {
            0.0
        };
        let id = hash_pattern_id(&language, &predicate_uri, &template);

        Self {
            id,
            language,
            predicate_uri,
            template,
            naturalness,
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn predicate_uri(&self) -> &str {
        &self.predicate_uri
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn naturalness(&self) -> f64 {
        self.naturalness
    }

    /// `true` for patterns without an explicit predicate token.
    pub fn is_sentinel(&self) -> bool {
        self.template.trim() == NO_PREDICATE_SENTINEL
    }
}

/// Read-only pattern inventory grouped by (predicate, language).
///
/// Within a group, patterns keep the order in which they were mined.
#[derive(Debug, Default)]
pub struct PatternStore {
    groups: HashMap<(String, String), Vec<Arc<Pattern>>>,
    len: usize,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_patterns(patterns: impl IntoIterator<Item = Pattern>) -> Self {
        let mut store = Self::new();
        for pattern in patterns {
            store.insert(pattern);
        }
        store
    }

    /// Loads a JSON array of `{language, predicate, template, naturalness}` records.
    pub fn load(path: &Path) -> PatternResult<Self> {
        if !path.exists() {
            return Err(PatternError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|source| PatternError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let patterns: Vec<Pattern> =
            serde_json::from_str(&raw).map_err(|source| PatternError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let store = Self::from_patterns(patterns);
        info!(
            path = %path.display(),
            patterns = store.len(),
            groups = store.groups.len(),
            "Loaded pattern inventory"
        );
        Ok(store)
    }

    pub fn insert(&mut self, pattern: Pattern) {
        let key = (pattern.predicate_uri.clone(), pattern.language.clone());
        self.groups.entry(key).or_default().push(Arc::new(pattern));
        self.len += 1;
    }

    /// Patterns for `predicate_uri` in `language`, in mining order.
    pub fn patterns_for(&self, predicate_uri: &str, language: &str) -> &[Arc<Pattern>] {
        self.groups
            .get(&(predicate_uri.to_string(), language.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Top `limit` patterns by naturalness; ties keep mining order.
    pub fn top_patterns(
        &self,
        predicate_uri: &str,
        language: &str,
        limit: usize,
    ) -> Vec<Arc<Pattern>> {
        let mut patterns = self.patterns_for(predicate_uri, language).to_vec();
        patterns.sort_by(|a, b| {
            b.naturalness
                .partial_cmp(&a.naturalness)
                .unwrap_or(Ordering::Equal)
        });
        patterns.truncate(limit);
        patterns
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
