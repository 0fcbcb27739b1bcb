use super::crawler::*;
use crate::cache::{CacheKey, EmptyResultPolicy, ResultCache};
use crate::evidence::Verdict;
use crate::fact::{Fact, Pattern};
use crate::query::MetaQuery;
use crate::search::{
    BackendResult, Document, MockFailure, MockSearchBackend, SearchBackend, SearchResult,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const BORN_IN: &str = "Einstein was born in Ulm";

fn fact() -> Fact {
    Fact::new("dbr:Albert_Einstein", "dbo:birthPlace", "dbr:Ulm")
        .with_labels("en", "Einstein", "Ulm")
}

fn query_for(template: &str, naturalness: f64) -> MetaQuery {
    let pattern = Arc::new(Pattern::new("en", "dbo:birthPlace", template, naturalness));
    MetaQuery::build(pattern, "Einstein", "Ulm")
}

fn wiki_doc(text: &str, rank: f64) -> Document {
    Document::new(
        "https://en.wikipedia.org/wiki/Albert_Einstein",
        "Albert Einstein",
        text,
        rank,
        "en",
    )
}

fn crawler_with(backends: Vec<Arc<dyn SearchBackend>>, cache: Arc<ResultCache>) -> EvidenceCrawler {
    EvidenceCrawler::new(backends, cache, CrawlConfig::default())
}

/// Echoes the query back as a one-sentence document and tracks concurrency.
struct TrackingBackend {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    slow_query: String,
    cancel_on_call: Option<CancellationFlag>,
}

impl TrackingBackend {
    fn new(slow_query: &str) -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            slow_query: slow_query.to_string(),
            cancel_on_call: None,
        }
    }
}

#[async_trait]
impl SearchBackend for TrackingBackend {
    fn id(&self) -> &str {
        "tracking"
    }

    async fn search(&self, query: &MetaQuery) -> BackendResult<SearchResult> {
        if let Some(flag) = &self.cancel_on_call {
            flag.cancel();
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = if query.raw_query == self.slow_query { 60 } else { 5 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let doc = Document::new(
            format!("https://tracking.org/{}", query.raw_query.replace(' ', "_")),
            "",
            format!("{}.", query.raw_query),
            1.0,
            query.language.clone(),
        );
        Ok(SearchResult::ranked(query, vec![doc], 1, 10))
    }
}

const BATCH_TEMPLATES: &[&str] = &[
    "?D? was born in ?R?",
    "?D? is a native of ?R?",
    "?D? came from ?R?",
    "?D? grew up in ?R?",
    "?D? lived in ?R?",
    "?D? hails from ?R?",
];

#[tokio::test]
async fn test_empty_worklist_issues_no_calls() {
    let mock = Arc::new(MockSearchBackend::new("elastic"));
    let backends: Vec<Arc<dyn SearchBackend>> = vec![mock.clone()];
    let crawler = crawler_with(backends, Arc::new(ResultCache::new()));

    let evidence = crawler.crawl_evidence(&fact(), &[]).await;

    assert!(evidence.proofs.is_empty());
    assert_eq!(evidence.stats.backend_calls, 0);
    assert_eq!(mock.call_count(), 0);
    assert_eq!(evidence.verdict(), Verdict::NotChecked);
}

#[tokio::test]
async fn test_single_matching_document_yields_one_proof() {
    let mock = Arc::new(
        MockSearchBackend::new("elastic")
            .with_documents(BORN_IN, vec![wiki_doc("Einstein was born in Ulm in 1879.", 1.0)]),
    );
    let backends: Vec<Arc<dyn SearchBackend>> = vec![mock.clone()];
    let crawler = crawler_with(backends, Arc::new(ResultCache::new()));

    let query = query_for("X was born in Y", 0.9);
    assert_eq!(query.raw_query, BORN_IN);
    let evidence = crawler.crawl_evidence(&fact(), &[query]).await;

    assert_eq!(evidence.proofs.len(), 1);
    let proof = &evidence.proofs[0];
    assert_eq!(proof.subject_surface, "Einstein");
    assert_eq!(proof.object_surface, "Ulm");
    assert_eq!(proof.sentence, "Einstein was born in Ulm in 1879.");
    assert_eq!(proof.language, "en");
    assert!(proof.score.is_none());

    assert_eq!(evidence.stats.queries, 1);
    assert_eq!(evidence.stats.backend_calls, 1);
    assert_eq!(evidence.stats.documents, 1);
    assert_eq!(evidence.stats.cache_hits, 0);
    assert!(!evidence.stats.cancelled);
}

#[tokio::test]
async fn test_second_crawl_is_served_from_cache() {
    let mock = Arc::new(
        MockSearchBackend::new("elastic")
            .with_documents(BORN_IN, vec![wiki_doc("Einstein was born in Ulm.", 1.0)]),
    );
    let backends: Vec<Arc<dyn SearchBackend>> = vec![mock.clone()];
    let crawler = crawler_with(backends, Arc::new(ResultCache::new()));
    let queries = vec![query_for("?D? was born in ?R?", 0.9)];

    let first = crawler.crawl_evidence(&fact(), &queries).await;
    let second = crawler.crawl_evidence(&fact(), &queries).await;

    assert_eq!(mock.call_count(), 1);
    assert_eq!(second.stats.cache_hits, 1);
    assert_eq!(second.stats.backend_calls, 0);
    assert_eq!(first.proofs.len(), second.proofs.len());
    assert_eq!(first.proofs[0].sentence, second.proofs[0].sentence);
}

#[tokio::test]
async fn test_failed_backend_degrades_to_empty_and_is_not_cached() {
    let mock = Arc::new(MockSearchBackend::new("elastic").with_failure(MockFailure::Unavailable));
    let backends: Vec<Arc<dyn SearchBackend>> = vec![mock.clone()];
    let cache = Arc::new(ResultCache::new());
    let crawler = crawler_with(backends, Arc::clone(&cache));
    let query = query_for("?D? was born in ?R?", 0.9);

    let evidence = crawler.crawl_evidence(&fact(), std::slice::from_ref(&query)).await;

    assert!(evidence.proofs.is_empty());
    assert_eq!(evidence.stats.failed_calls, 1);
    assert_eq!(evidence.verdict(), Verdict::InsufficientEvidence);
    assert!(!cache.contains(&CacheKey::new("elastic", &query)));

    crawler.crawl_evidence(&fact(), std::slice::from_ref(&query)).await;
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn test_one_malformed_query_does_not_abort_batch() {
    let native = query_for("?D? is a native of ?R?", 0.8);
    let mock = Arc::new(
        MockSearchBackend::new("elastic")
            .with_default_documents(vec![wiki_doc(
                "Einstein was born in Ulm. Einstein is a native of Ulm.",
                1.0,
            )])
            .with_failing_query(BORN_IN),
    );
    let backends: Vec<Arc<dyn SearchBackend>> = vec![mock.clone()];
    let crawler = crawler_with(backends, Arc::new(ResultCache::new()));

    let queries = vec![query_for("?D? was born in ?R?", 0.9), native];
    let evidence = crawler.crawl_evidence(&fact(), &queries).await;

    assert_eq!(evidence.stats.failed_calls, 1);
    assert_eq!(evidence.proofs.len(), 1);
    assert_eq!(evidence.proofs[0].sentence, "Einstein is a native of Ulm.");
}

#[tokio::test]
async fn test_timeout_counts_as_failure() {
    let mock = Arc::new(
        MockSearchBackend::new("elastic")
            .with_default_documents(vec![wiki_doc("Einstein was born in Ulm.", 1.0)])
            .with_delay(Duration::from_millis(300)),
    );
    let backends: Vec<Arc<dyn SearchBackend>> = vec![mock.clone()];
    let config = CrawlConfig {
        request_timeout: Duration::from_millis(20),
        ..CrawlConfig::default()
    };
    let crawler = EvidenceCrawler::new(backends, Arc::new(ResultCache::new()), config);

    let evidence = crawler
        .crawl_evidence(&fact(), &[query_for("?D? was born in ?R?", 0.9)])
        .await;

    assert!(evidence.proofs.is_empty());
    assert_eq!(evidence.stats.failed_calls, 1);
}

#[tokio::test]
async fn test_empty_result_policy() {
    for (policy, expected_calls) in [(EmptyResultPolicy::Cache, 1), (EmptyResultPolicy::Retry, 2)] {
        let mock = Arc::new(MockSearchBackend::new("elastic"));
        let backends: Vec<Arc<dyn SearchBackend>> = vec![mock.clone()];
        let cache = Arc::new(ResultCache::new().with_empty_policy(policy));
        let crawler = crawler_with(backends, cache);
        let queries = vec![query_for("?D? was born in ?R?", 0.9)];

        crawler.crawl_evidence(&fact(), &queries).await;
        crawler.crawl_evidence(&fact(), &queries).await;

        assert_eq!(mock.call_count(), expected_calls, "policy {:?}", policy);
    }
}

#[tokio::test]
async fn test_proofs_ordered_by_naturalness_then_rank() {
    let weak = query_for("?D? was born in ?R?", 0.5);
    let strong = query_for("?D? is a native of ?R?", 0.9);
    let mock = Arc::new(
        MockSearchBackend::new("elastic")
            .with_documents(
                weak.raw_query.clone(),
                vec![
                    Document::new("https://low.org", "", "Einstein was born in Ulm.", 0.2, "en"),
                    Document::new("https://high.org", "", "Einstein was born in Ulm.", 0.8, "en"),
                ],
            )
            .with_documents(
                strong.raw_query.clone(),
                vec![Document::new(
                    "https://native.org",
                    "",
                    "Einstein is a native of Ulm.",
                    0.1,
                    "en",
                )],
            ),
    );
    let backends: Vec<Arc<dyn SearchBackend>> = vec![mock.clone()];
    let crawler = crawler_with(backends, Arc::new(ResultCache::new()));

    let evidence = crawler.crawl_evidence(&fact(), &[weak, strong]).await;

    let urls: Vec<&str> = evidence
        .proofs
        .iter()
        .map(|p| p.document.url.as_str())
        .collect();
    assert_eq!(urls, vec!["https://native.org", "https://high.org", "https://low.org"]);
}

#[tokio::test]
async fn test_discovery_order_is_independent_of_completion_order() {
    let queries: Vec<MetaQuery> = BATCH_TEMPLATES.iter().map(|t| query_for(t, 0.9)).collect();
    let tracking = Arc::new(TrackingBackend::new(&queries[0].raw_query));
    let backends: Vec<Arc<dyn SearchBackend>> = vec![tracking.clone()];
    let crawler = crawler_with(backends, Arc::new(ResultCache::new()));

    let evidence = crawler.crawl_evidence(&fact(), &queries).await;

    let sentences: Vec<String> = evidence.proofs.iter().map(|p| p.sentence.clone()).collect();
    let expected: Vec<String> = queries.iter().map(|q| format!("{}.", q.raw_query)).collect();
    assert_eq!(sentences, expected);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let queries: Vec<MetaQuery> = BATCH_TEMPLATES.iter().map(|t| query_for(t, 0.9)).collect();
    let tracking = Arc::new(TrackingBackend::new(""));
    let backends: Vec<Arc<dyn SearchBackend>> = vec![tracking.clone()];
    let config = CrawlConfig {
        max_concurrency: 2,
        ..CrawlConfig::default()
    };
    let crawler = EvidenceCrawler::new(backends, Arc::new(ResultCache::new()), config);

    let evidence = crawler.crawl_evidence(&fact(), &queries).await;

    assert_eq!(evidence.stats.backend_calls, BATCH_TEMPLATES.len());
    let peak = tracking.peak.load(Ordering::SeqCst);
    assert!((1..=2).contains(&peak), "peak in-flight calls: {}", peak);
}

#[tokio::test]
async fn test_cancelled_before_start_dispatches_nothing() {
    let mock = Arc::new(MockSearchBackend::new("elastic"));
    let backends: Vec<Arc<dyn SearchBackend>> = vec![mock.clone()];
    let crawler = crawler_with(backends, Arc::new(ResultCache::new()));
    let cancel = CancellationFlag::new();
    cancel.cancel();

    let evidence = crawler
        .crawl_evidence_with_cancel(&fact(), &[query_for("?D? was born in ?R?", 0.9)], &cancel)
        .await;

    assert_eq!(mock.call_count(), 0);
    assert_eq!(evidence.stats.queries, 1);
    assert_eq!(evidence.stats.dispatched, 0);
    assert!(evidence.stats.cancelled);
}

#[tokio::test]
async fn test_cancel_mid_crawl_stops_dispatching() {
    let queries: Vec<MetaQuery> = BATCH_TEMPLATES.iter().map(|t| query_for(t, 0.9)).collect();
    let cancel = CancellationFlag::new();
    let tracking = Arc::new(TrackingBackend {
        cancel_on_call: Some(cancel.clone()),
        ..TrackingBackend::new("")
    });
    let backends: Vec<Arc<dyn SearchBackend>> = vec![tracking.clone()];
    let config = CrawlConfig {
        max_concurrency: 1,
        ..CrawlConfig::default()
    };
    let crawler = EvidenceCrawler::new(backends, Arc::new(ResultCache::new()), config);

    let evidence = crawler.crawl_evidence_with_cancel(&fact(), &queries, &cancel).await;

    assert!(evidence.stats.cancelled);
    assert!(evidence.stats.dispatched < BATCH_TEMPLATES.len());
    // in-flight calls drain and still produce proofs
    assert_eq!(evidence.proofs.len(), evidence.stats.dispatched);
}

#[tokio::test]
async fn test_every_backend_is_queried() {
    let text = "Einstein was born in Ulm.";
    let elastic = Arc::new(MockSearchBackend::new("elastic").with_default_documents(vec![
        Document::new("https://elastic.org", "", text, 1.0, "en"),
    ]));
    let web = Arc::new(MockSearchBackend::new("web").with_default_documents(vec![Document::new(
        "https://web.org",
        "",
        text,
        1.0,
        "en",
    )]));
    let backends: Vec<Arc<dyn SearchBackend>> = vec![elastic.clone(), web.clone()];
    let crawler = crawler_with(backends, Arc::new(ResultCache::new()));

    let evidence = crawler
        .crawl_evidence(&fact(), &[query_for("?D? was born in ?R?", 0.9)])
        .await;

    assert_eq!(elastic.call_count(), 1);
    assert_eq!(web.call_count(), 1);
    assert_eq!(evidence.stats.backend_calls, 2);
    let urls: Vec<&str> = evidence.proofs.iter().map(|p| p.document.url.as_str()).collect();
    assert_eq!(urls, vec!["https://elastic.org", "https://web.org"]);
}
