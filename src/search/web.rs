//! General web-search backend (Bing Web Search v7 response shape).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::backend::SearchBackend;
use super::error::{BackendError, BackendResult};
use super::http::{build_client, read_body};
use super::types::{Document, SearchResult};
use crate::config::Config;
use crate::query::MetaQuery;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebResponse {
    #[serde(default)]
    web_pages: Option<WebPages>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebPages {
    #[serde(default)]
    total_estimated_matches: u64,
    #[serde(default)]
    value: Vec<WebPage>,
}

#[derive(Debug, Deserialize)]
struct WebPage {
    #[serde(default)]
    name: Option<String>,
    url: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

/// Maps a language tag to a search market.
pub fn market_for(language: &str) -> String {
    match language {
        "en" => "en-US".to_string(),
        "de" => "de-DE".to_string(),
        "fr" => "fr-FR".to_string(),
        "es" => "es-ES".to_string(),
        "it" => "it-IT".to_string(),
        other => other.to_string(),
    }
}

/// Parses a web search response; a missing `webPages` block is an empty result.
pub(crate) fn parse_web_response(
    body: &str,
    query: &MetaQuery,
    cap: usize,
) -> Result<SearchResult, String> {
    let response: WebResponse = serde_json::from_str(body).map_err(|e| e.to_string())?;
    let Some(pages) = response.web_pages else {
        return Ok(SearchResult::empty(query));
    };

    let n = pages.value.len().max(1) as f64;
    let documents = pages
        .value
        .into_iter()
        .enumerate()
        .map(|(i, page)| {
            Document::new(
                page.url,
                page.name.unwrap_or_default(),
                page.snippet.unwrap_or_default(),
                1.0 - i as f64 / n,
                page.language.unwrap_or_else(|| query.language.clone()),
            )
            .with_predicate_label(query.predicate_label.clone())
        })
        .collect();

    Ok(SearchResult::ranked(
        query,
        documents,
        pages.total_estimated_matches,
        cap,
    ))
}

/// Web search API client authenticated with a subscription key.
pub struct WebSearchBackend {
    http: Client,
    endpoint: String,
    api_key: String,
    max_results: usize,
    timeout: Duration,
}

impl std::fmt::Debug for WebSearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSearchBackend")
            .field("endpoint", &self.endpoint)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

impl WebSearchBackend {
    pub const ID: &'static str = "web";

    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        max_results: usize,
        timeout: Duration,
    ) -> BackendResult<Self> {
        Ok(Self {
            http: build_client(Self::ID, timeout)?,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            max_results,
            timeout,
        })
    }

    /// Requires `web_search_url` and `web_search_key` (see [`Config::validate`]).
    pub fn from_config(config: &Config) -> BackendResult<Self> {
        let missing = |what: &str| BackendError::Client {
            backend: Self::ID.to_string(),
            reason: format!("{} not configured", what),
        };
        let endpoint = config
            .web_search_url
            .clone()
            .ok_or_else(|| missing("web search URL"))?;
        let api_key = config
            .web_search_key
            .clone()
            .ok_or_else(|| missing("web search key"))?;

        Self::new(
            endpoint,
            api_key,
            config.number_of_search_results,
            config.request_timeout,
        )
    }

    async fn fetch(&self, query: &MetaQuery, count: usize) -> BackendResult<String> {
        let count = count.to_string();
        let market = market_for(&query.language);
        let response = self
            .http
            .get(&self.endpoint)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .query(&[
                ("q", query.raw_query.as_str()),
                ("count", count.as_str()),
                ("mkt", market.as_str()),
            ])
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(Self::ID, self.timeout, e))?;

        read_body(Self::ID, self.timeout, response).await
    }

    fn malformed(reason: String) -> BackendError {
        BackendError::MalformedResponse {
            backend: Self::ID.to_string(),
            reason,
        }
    }
}

#[async_trait]
impl SearchBackend for WebSearchBackend {
    fn id(&self) -> &str {
        Self::ID
    }

    #[instrument(skip(self, query), fields(query = %query))]
    async fn search(&self, query: &MetaQuery) -> BackendResult<SearchResult> {
        let raw = self.fetch(query, self.max_results).await?;
        let result =
            parse_web_response(&raw, query, self.max_results).map_err(Self::malformed)?;

        debug!(
            documents = result.documents.len(),
            total_hits = result.total_hit_count,
            "Web search query finished"
        );
        Ok(result)
    }

    async fn count(&self, query: &MetaQuery) -> BackendResult<u64> {
        let raw = self.fetch(query, 1).await?;
        parse_web_response(&raw, query, 1)
            .map(|r| r.total_hit_count)
            .map_err(Self::malformed)
    }
}
