use futures_util::future;
use futures_util::stream::{self, StreamExt};
use std::cmp::Ordering as CmpOrdering;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use super::matcher::{CompiledTemplate, LabelHints, PatternMatcher};
use crate::cache::{CacheKey, ResultCache};
use crate::config::Config;
use crate::constants::{
    DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_PLACEHOLDER_TOKENS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::evidence::{ComplexProof, CrawlStats, Evidence, FeatureVector};
use crate::fact::Fact;
use crate::query::MetaQuery;
use crate::search::{BackendError, SearchBackend, SearchResult};

/// Shared stop signal for an in-progress crawl.
///
/// Cancelling stops dispatching new calls; calls already in flight complete.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Crawl tuning.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Upper bound on in-flight backend calls.
    pub max_concurrency: usize,
    /// Independent timeout per backend call.
    pub request_timeout: Duration,
    pub max_placeholder_tokens: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_placeholder_tokens: DEFAULT_MAX_PLACEHOLDER_TOKENS,
        }
    }
}

impl CrawlConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            request_timeout: config.request_timeout,
            max_placeholder_tokens: config.max_placeholder_tokens,
        }
    }
}

/// Position of a proof in the deterministic discovery order:
/// (query index, backend index, document index, match index).
type Discovery = (usize, usize, usize, usize);

enum Fetched {
    Cached(SearchResult),
    Fresh(SearchResult),
    Failed,
}

struct CallOutcome {
    stats: CrawlStats,
    proofs: Vec<(Discovery, ComplexProof)>,
}

/// Fans the query worklist out over every backend, through the result
/// cache, and turns matching sentences into proofs.
pub struct EvidenceCrawler {
    backends: Vec<Arc<dyn SearchBackend>>,
    cache: Arc<ResultCache>,
    matcher: PatternMatcher,
    config: CrawlConfig,
}

impl EvidenceCrawler {
    pub fn new(
        backends: Vec<Arc<dyn SearchBackend>>,
        cache: Arc<ResultCache>,
        config: CrawlConfig,
    ) -> Self {
        Self {
            backends,
            cache,
            matcher: PatternMatcher::new(config.max_placeholder_tokens),
            config,
        }
    }

    pub fn backends(&self) -> &[Arc<dyn SearchBackend>] {
        &self.backends
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub async fn crawl_evidence(&self, fact: &Fact, queries: &[MetaQuery]) -> Evidence {
        self.crawl_evidence_with_cancel(fact, queries, &CancellationFlag::new())
            .await
    }

    /// Crawls every (query, backend) pair with bounded concurrency.
    ///
    /// Never fails: a failed or timed-out call contributes zero documents.
    #[instrument(skip_all, fields(fact = %fact, queries = queries.len()))]
    pub async fn crawl_evidence_with_cancel(
        &self,
        fact: &Fact,
        queries: &[MetaQuery],
        cancel: &CancellationFlag,
    ) -> Evidence {
        let mut evidence = Evidence::unchecked(fact.clone());
        evidence.stats.queries = queries.len();
        if queries.is_empty() {
            return evidence;
        }

        let start = Instant::now();
        let calls: Vec<(usize, usize)> = (0..queries.len())
            .flat_map(|q| (0..self.backends.len()).map(move |b| (q, b)))
            .collect();
        let planned = calls.len();

        let outcomes: Vec<CallOutcome> = stream::iter(calls)
            .take_while(|_| future::ready(!cancel.is_cancelled()))
            .map(|(q, b)| self.crawl_call(q, &queries[q], b))
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut stats = evidence.stats;
        stats.dispatched = outcomes.len();
        stats.cancelled = outcomes.len() < planned;

        let mut proofs = Vec::new();
        for outcome in outcomes {
            stats.merge(&outcome.stats);
            proofs.extend(outcome.proofs);
        }
        proofs.sort_by(|(a_seq, a), (b_seq, b)| proof_order(a, b).then_with(|| a_seq.cmp(b_seq)));

        evidence.proofs = proofs.into_iter().map(|(_, proof)| proof).collect();
        evidence.stats = stats;

        debug!(
            proofs = evidence.proofs.len(),
            backend_calls = stats.backend_calls,
            cache_hits = stats.cache_hits,
            failed_calls = stats.failed_calls,
            cancelled = stats.cancelled,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Crawl finished"
        );
        evidence
    }

    async fn crawl_call(&self, q: usize, query: &MetaQuery, b: usize) -> CallOutcome {
        let mut outcome = CallOutcome {
            stats: CrawlStats::default(),
            proofs: Vec::new(),
        };
        let Some(backend) = self.backends.get(b) else {
            return outcome;
        };

        let result = match self.fetch(backend.as_ref(), query).await {
            Fetched::Cached(result) => {
                outcome.stats.cache_hits += 1;
                result
            }
            Fetched::Fresh(result) => {
                outcome.stats.backend_calls += 1;
                result
            }
            Fetched::Failed => {
                outcome.stats.backend_calls += 1;
                outcome.stats.failed_calls += 1;
                return outcome;
            }
        };

        outcome.stats.documents += result.len();
        outcome.stats.total_hit_count += result.total_hit_count;

        let template = CompiledTemplate::compile(query.pattern.template());
        let hints = LabelHints::new(&query.subject_label, &query.object_label);

        for (d, document) in result.documents.iter().enumerate() {
            let matches = self.matcher.find_compiled(&document.text, &template, hints);
            for (m, found) in matches.into_iter().enumerate() {
                let sentence = document.text[found.sentence_span.clone()].to_string();
                let proof = ComplexProof {
                    document: Arc::clone(document),
                    pattern: Arc::clone(&query.pattern),
                    language: query.language.clone(),
                    sentence,
                    sentence_span: found.sentence_span,
                    subject_surface: found.subject_surface,
                    object_surface: found.object_surface,
                    subject_tokens: found.subject_tokens,
                    object_tokens: found.object_tokens,
                    sentence_tokens: found.sentence_tokens,
                    features: FeatureVector::new(),
                    score: None,
                };
                outcome.proofs.push(((q, b, d, m), proof));
            }
        }

        outcome
    }

    /// Cache first, then the backend under the per-call timeout.
    ///
    /// Failures are logged and never cached.
    async fn fetch(&self, backend: &dyn SearchBackend, query: &MetaQuery) -> Fetched {
        let key = CacheKey::new(backend.id(), query);
        if let Some(hit) = self.cache.get(&key) {
            debug!(backend = backend.id(), query = %query, "Result cache hit");
            return Fetched::Cached(hit);
        }

        let timeout = self.config.request_timeout;
        let error = match tokio::time::timeout(timeout, backend.search(query)).await {
            Ok(Ok(result)) => {
                let stored = self.cache.put(key, &result);
                debug!(
                    backend = backend.id(),
                    query = %query,
                    documents = result.len(),
                    cached = stored,
                    "Backend call succeeded"
                );
                return Fetched::Fresh(result);
            }
            Ok(Err(e)) => e,
            Err(_) => BackendError::Timeout {
                backend: backend.id().to_string(),
                timeout_ms: timeout.as_millis() as u64,
            },
        };

        warn!(
            backend = backend.id(),
            query = %query,
            error = %error,
            "Backend call failed, continuing with zero documents"
        );
        Fetched::Failed
    }
}

/// Naturalness descending, then document rank descending.
fn proof_order(a: &ComplexProof, b: &ComplexProof) -> CmpOrdering {
    b.pattern
        .naturalness()
        .partial_cmp(&a.pattern.naturalness())
        .unwrap_or(CmpOrdering::Equal)
        .then_with(|| {
            b.document
                .rank
                .partial_cmp(&a.document.rank)
                .unwrap_or(CmpOrdering::Equal)
        })
}
