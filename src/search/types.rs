use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

use crate::fact::Pattern;
use crate::query::MetaQuery;

/// A crawled page returned by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub title: String,
    pub text: String,
    /// Backend rank; higher is better.
    pub rank: f64,
    pub language: String,
    /// Predicate label of the query that surfaced this page.
    #[serde(default)]
    pub matched_predicate_label: String,
}

impl Document {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        rank: f64,
        language: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            text: text.into(),
            rank: if rank.is_finite() { rank } else { 0.0 },
            language: language.into(),
            matched_predicate_label: String::new(),
        }
    }

    pub fn with_predicate_label(mut self, label: impl Into<String>) -> Self {
        self.matched_predicate_label = label.into();
        self
    }

    /// Lowercased host of the URL without a leading `www.`.
    pub fn domain(&self) -> Option<String> {
        let url = reqwest::Url::parse(&self.url).ok()?;
        let host = url.host_str()?.to_lowercase();
        Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
    }
}

/// Documents returned for one query by one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: MetaQuery,
    pub documents: Vec<Arc<Document>>,
    /// Hits reported by the backend; may exceed `documents.len()`.
    pub total_hit_count: u64,
    /// Set when served from the result cache.
    #[serde(skip)]
    pub cache_hit: bool,
}

impl SearchResult {
    /// Zero documents, zero hits.
    pub fn empty(query: &MetaQuery) -> Self {
        Self {
            query: query.clone(),
            documents: Vec::new(),
            total_hit_count: 0,
            cache_hit: false,
        }
    }

    /// Keeps the `cap` highest-ranked documents (stable on equal rank).
    pub fn ranked(
        query: &MetaQuery,
        mut documents: Vec<Document>,
        total_hit_count: u64,
        cap: usize,
    ) -> Self {
        let total_hit_count = total_hit_count.max(documents.len() as u64);
        documents.sort_by(|a, b| b.rank.partial_cmp(&a.rank).unwrap_or(Ordering::Equal));
        documents.truncate(cap);

        Self {
            query: query.clone(),
            documents: documents.into_iter().map(Arc::new).collect(),
            total_hit_count,
            cache_hit: false,
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.query.pattern
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }
}
