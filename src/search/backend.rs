use async_trait::async_trait;
use tracing::warn;

use super::error::BackendResult;
use super::types::SearchResult;
use crate::query::MetaQuery;

/// A search engine the crawler can send queries to.
///
/// Implementations own their HTTP session and response parsing; callers never
/// branch on which backend they hold.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Stable identifier, part of every cache key.
    fn id(&self) -> &str;

    /// Runs `query`, returning at most the configured number of documents.
    async fn search(&self, query: &MetaQuery) -> BackendResult<SearchResult>;

    /// Total hits the backend reports for `query`.
    async fn count(&self, _query: &MetaQuery) -> BackendResult<u64> {
        Ok(0)
    }

    /// [`search`](Self::search) with failures logged and mapped to an empty result.
    async fn query(&self, query: &MetaQuery) -> SearchResult {
        match self.search(query).await {
            Ok(result) => result,
            Err(e) => {
                warn!(backend = self.id(), query = %query, error = %e, "Search failed");
                SearchResult::empty(query)
            }
        }
    }

    /// [`count`](Self::count) with failures logged and mapped to zero.
    async fn number_of_results(&self, query: &MetaQuery) -> u64 {
        match self.count(query).await {
            Ok(n) => n,
            Err(e) => {
                warn!(backend = self.id(), query = %query, error = %e, "Count failed");
                0
            }
        }
    }
}
