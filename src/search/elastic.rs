//! Elasticsearch backend over an article corpus (one document per page).
//!
//! Sends a sloppy `match_phrase` on the `Article` field and reads `Article`,
//! `URL`, `Title` and `Pagerank` from each hit's `_source`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument};

use super::backend::SearchBackend;
use super::error::{BackendError, BackendResult};
use super::http::{build_client, read_body};
use super::types::{Document, SearchResult};
use crate::config::Config;
use crate::constants::ELASTIC_PHRASE_SLOP;
use crate::query::MetaQuery;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    total: Total,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// `hits.total` is a bare number before ES 7 and `{value, relation}` after.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Total {
    Count(u64),
    Object { value: u64 },
}

impl Total {
    fn value(&self) -> u64 {
        match self {
            Total::Count(n) | Total::Object { value: n } => *n,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Source,
}

#[derive(Debug, Deserialize)]
struct Source {
    #[serde(rename = "Article", default)]
    article: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Pagerank", default)]
    pagerank: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

fn pagerank(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Parses a `_search` response body into at most `cap` documents.
pub(crate) fn parse_search_response(
    body: &str,
    query: &MetaQuery,
    cap: usize,
) -> Result<SearchResult, String> {
    let response: SearchResponse = serde_json::from_str(body).map_err(|e| e.to_string())?;

    let documents = response
        .hits
        .hits
        .into_iter()
        .map(|hit| {
            Document::new(
                hit.source.url.unwrap_or_default(),
                hit.source.title.unwrap_or_default(),
                hit.source.article.unwrap_or_default(),
                pagerank(hit.source.pagerank.as_ref()),
                query.language.clone(),
            )
            .with_predicate_label(query.predicate_label.clone())
        })
        .collect();

    Ok(SearchResult::ranked(
        query,
        documents,
        response.hits.total.value(),
        cap,
    ))
}

/// Elasticsearch `_search` / `_count` client.
pub struct ElasticBackend {
    http: Client,
    base_url: String,
    index: String,
    max_results: usize,
    timeout: Duration,
}

impl std::fmt::Debug for ElasticBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticBackend")
            .field("base_url", &self.base_url)
            .field("index", &self.index)
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl ElasticBackend {
    pub const ID: &'static str = "elastic";

    pub fn new(
        base_url: impl Into<String>,
        index: impl Into<String>,
        max_results: usize,
        timeout: Duration,
    ) -> BackendResult<Self> {
        Ok(Self {
            http: build_client(Self::ID, timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            index: index.into().trim_matches('/').to_string(),
            max_results,
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> BackendResult<Self> {
        Self::new(
            config.elastic_url.clone(),
            config.elastic_index.clone(),
            config.number_of_search_results,
            config.request_timeout,
        )
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.index, action)
    }

    fn phrase_query(&self, query: &MetaQuery) -> Value {
        json!({
            "match_phrase": {
                "Article": {
                    "query": query.raw_query,
                    "slop": ELASTIC_PHRASE_SLOP,
                }
            }
        })
    }

    async fn post(&self, action: &str, body: Value) -> BackendResult<String> {
        let response = self
            .http
            .post(self.endpoint(action))
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(Self::ID, self.timeout, e))?;

        read_body(Self::ID, self.timeout, response).await
    }
}

#[async_trait]
impl SearchBackend for ElasticBackend {
    fn id(&self) -> &str {
        Self::ID
    }

    #[instrument(skip(self, query), fields(query = %query))]
    async fn search(&self, query: &MetaQuery) -> BackendResult<SearchResult> {
        let body = json!({
            "size": self.max_results,
            "query": self.phrase_query(query),
        });
        let raw = self.post("_search", body).await?;

        let result = parse_search_response(&raw, query, self.max_results).map_err(|reason| {
            BackendError::MalformedResponse {
                backend: Self::ID.to_string(),
                reason,
            }
        })?;

        debug!(
            documents = result.documents.len(),
            total_hits = result.total_hit_count,
            "Elasticsearch query finished"
        );
        Ok(result)
    }

    async fn count(&self, query: &MetaQuery) -> BackendResult<u64> {
        let raw = self
            .post("_count", json!({ "query": self.phrase_query(query) }))
            .await?;

        serde_json::from_str::<CountResponse>(&raw)
            .map(|c| c.count)
            .map_err(|e| BackendError::MalformedResponse {
                backend: Self::ID.to_string(),
                reason: e.to_string(),
            })
    }
}
