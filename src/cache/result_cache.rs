use moka::sync::Cache;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

use crate::constants::DEFAULT_CACHE_CAPACITY;
use crate::hashing::{hash_query_key, key_from_hex, key_to_hex};
use crate::query::MetaQuery;
use crate::search::SearchResult;

/// BLAKE3 key over backend id, normalized query text and pattern id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn new(backend_id: &str, query: &MetaQuery) -> Self {
        Self(hash_query_key(
            backend_id,
            &query.normalized_query(),
            query.pattern.id(),
        ))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        key_to_hex(&self.0)
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        key_from_hex(hex).map(Self)
    }
}

/// Whether backend results without documents are cached.
///
/// Failed calls are never cached; this only covers genuine empty answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyResultPolicy {
    /// Cache empty results like any other.
    #[default]
    Cache,
    /// Leave empty results uncached so the next run asks again.
    Retry,
}

impl FromStr for EmptyResultPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cache" | "true" | "1" => Ok(Self::Cache),
            "retry" | "false" | "0" => Ok(Self::Retry),
            _ => Err(format!("unknown empty result policy: {}", s)),
        }
    }
}

/// Hit/miss counters and the current entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

/// Concurrent memo of backend responses shared by every crawl.
///
/// Values for a key are deterministic, so racing writers may overwrite each
/// other. Capacity-bounded eviction only costs a repeated backend call.
pub struct ResultCache {
    entries: Cache<CacheKey, Arc<SearchResult>>,
    empty_policy: EmptyResultPolicy,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.entries.entry_count())
            .field("empty_policy", &self.empty_policy)
            .finish()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    /// Creates a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a cache bounded to `capacity` entries.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
            empty_policy: EmptyResultPolicy::default(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn with_empty_policy(mut self, policy: EmptyResultPolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    pub fn empty_policy(&self) -> EmptyResultPolicy {
        self.empty_policy
    }

    /// Returns a copy of the cached result tagged `cache_hit = true`.
    pub fn get(&self, key: &CacheKey) -> Option<SearchResult> {
        match self.entries.get(key) {
            Some(cached) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key.to_hex(), "Result cache hit");
                let mut result = SearchResult::clone(&cached);
                result.cache_hit = true;
                Some(result)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores `result` unless the empty-result policy says otherwise.
    ///
    /// Returns `true` if the entry was written.
    pub fn put(&self, key: CacheKey, result: &SearchResult) -> bool {
        if result.is_empty() && self.empty_policy == EmptyResultPolicy::Retry {
            return false;
        }

        let mut stored = result.clone();
        stored.cache_hit = false;
        self.entries.insert(key, Arc::new(stored));
        true
    }

    /// Inserts without consulting the policy (snapshot restore).
    pub(crate) fn insert_raw(&self, key: CacheKey, result: SearchResult) {
        self.entries.insert(key, Arc::new(result));
    }

    /// All live entries (snapshot save).
    pub(crate) fn iter_entries(&self) -> impl Iterator<Item = (CacheKey, Arc<SearchResult>)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&self, key: &CacheKey) {
        self.entries.invalidate(key);
    }

    /// Number of entries. Eventually consistent; see [`Self::run_pending_tasks`].
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Runs any pending maintenance tasks in the underlying cache.
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.entry_count(),
        }
    }
}
