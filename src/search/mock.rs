use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::backend::SearchBackend;
use super::error::{BackendError, BackendResult};
use super::types::{Document, SearchResult};
use crate::constants::DEFAULT_NUMBER_OF_SEARCH_RESULTS;
use crate::query::MetaQuery;

/// Failure injected into every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Unavailable,
    Malformed,
    Status(u16),
}

/// In-memory backend with canned documents and failure injection.
pub struct MockSearchBackend {
    id: String,
    responses: RwLock<HashMap<String, Vec<Document>>>,
    default_documents: RwLock<Vec<Document>>,
    failing_queries: RwLock<HashSet<String>>,
    failure: RwLock<Option<MockFailure>>,
    delay: RwLock<Option<Duration>>,
    max_results: usize,
    calls: AtomicUsize,
}

impl MockSearchBackend {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            responses: RwLock::new(HashMap::new()),
            default_documents: RwLock::new(Vec::new()),
            failing_queries: RwLock::new(HashSet::new()),
            failure: RwLock::new(None),
            delay: RwLock::new(None),
            max_results: DEFAULT_NUMBER_OF_SEARCH_RESULTS,
            calls: AtomicUsize::new(0),
        }
    }

    /// Documents returned for queries whose raw text equals `raw_query`.
    pub fn with_documents(self, raw_query: impl Into<String>, documents: Vec<Document>) -> Self {
        self.responses.write().insert(raw_query.into(), documents);
        self
    }

    /// Documents returned for every query without a specific response.
    pub fn with_default_documents(self, documents: Vec<Document>) -> Self {
        *self.default_documents.write() = documents;
        self
    }

    pub fn with_failure(self, failure: MockFailure) -> Self {
        *self.failure.write() = Some(failure);
        self
    }

    /// Only queries with this raw text fail (as malformed payloads).
    pub fn with_failing_query(self, raw_query: impl Into<String>) -> Self {
        self.failing_queries.write().insert(raw_query.into());
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.write() = Some(delay);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn set_failure(&self, failure: Option<MockFailure>) {
        *self.failure.write() = failure;
    }

    /// Number of `search` calls received (cache hits never reach the backend).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn error(&self, failure: MockFailure) -> BackendError {
        match failure {
            MockFailure::Unavailable => BackendError::Unavailable {
                backend: self.id.clone(),
                reason: "connection refused".to_string(),
            },
            MockFailure::Malformed => BackendError::MalformedResponse {
                backend: self.id.clone(),
                reason: "expected value at line 1 column 1".to_string(),
            },
            MockFailure::Status(status) => BackendError::Status {
                backend: self.id.clone(),
                status,
                body: String::new(),
            },
        }
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    fn id(&self) -> &str {
        &self.id
    }

    async fn search(&self, query: &MetaQuery) -> BackendResult<SearchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = *self.failure.read();
        if let Some(failure) = failure {
            return Err(self.error(failure));
        }
        if self.failing_queries.read().contains(&query.raw_query) {
            return Err(self.error(MockFailure::Malformed));
        }

        let documents: Vec<Document> = self
            .responses
            .read()
            .get(&query.raw_query)
            .cloned()
            .unwrap_or_else(|| self.default_documents.read().clone())
            .into_iter()
            .map(|mut doc| {
                if doc.language.is_empty() {
                    doc.language = query.language.clone();
                }
                doc.with_predicate_label(query.predicate_label.clone())
            })
            .collect();

        let total = documents.len() as u64;
        Ok(SearchResult::ranked(query, documents, total, self.max_results))
    }

    async fn count(&self, query: &MetaQuery) -> BackendResult<u64> {
        if let Some(failure) = *self.failure.read() {
            return Err(self.error(failure));
        }
        Ok(self
            .responses
            .read()
            .get(&query.raw_query)
            .map(|d| d.len())
            .unwrap_or_else(|| self.default_documents.read().len()) as u64)
    }
}
