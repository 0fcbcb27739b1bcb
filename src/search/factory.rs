use std::sync::Arc;
use tracing::info;

use super::backend::SearchBackend;
use super::elastic::ElasticBackend;
use super::error::BackendResult;
use super::web::WebSearchBackend;
use crate::config::{BackendKind, Config};

/// Builds the configured [`SearchBackend`]s, in configuration order.
pub fn build_search_backends(config: &Config) -> BackendResult<Vec<Arc<dyn SearchBackend>>> {
    let mut backends: Vec<Arc<dyn SearchBackend>> = Vec::with_capacity(config.backends.len());
    for kind in &config.backends {
        let backend: Arc<dyn SearchBackend> = match kind {
            BackendKind::Elastic => Arc::new(ElasticBackend::from_config(config)?),
            BackendKind::Web => Arc::new(WebSearchBackend::from_config(config)?),
        };
        info!(backend = backend.id(), "Search backend ready");
        backends.push(backend);
    }
    Ok(backends)
}
