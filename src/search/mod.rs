//! Search backend adapters.
//!
//! Every backend implements [`SearchBackend`]. Response parsing stays inside
//! each implementation; callers only see [`SearchResult`]s of [`Document`]s.
//!
//! Failures come back as [`BackendError`] from [`SearchBackend::search`]. The
//! provided [`SearchBackend::query`] logs them and returns an empty result so
//! a single bad query never aborts a crawl.

pub mod backend;
pub mod elastic;
pub mod error;
pub mod factory;
mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod types;
pub mod web;


pub use backend::SearchBackend;
pub use elastic::ElasticBackend;
pub use error::{BackendError, BackendResult};
pub use factory::build_search_backends;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockFailure, MockSearchBackend};
pub use types::{Document, SearchResult};
pub use web::{WebSearchBackend, market_for};
