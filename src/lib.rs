//! Factcheck library crate (used by the CLI binary and integration tests).
//!
//! # Public API Surface
//!
//! The pipeline runs one fact at a time through these modules:
//!
//! ## Inputs
//! - [`Fact`], [`Labels`] - The triple under test and its per-language labels
//! - [`Pattern`], [`PatternStore`] - Mined lexical templates per predicate
//! - [`Config`], [`ConfigError`] - Environment-driven configuration
//!
//! ## Crawling
//! - [`QueryGenerator`], [`MetaQuery`] - Queries built from patterns and labels
//! - [`SearchBackend`], [`ElasticBackend`], [`WebSearchBackend`] - Document sources
//! - [`ResultCache`] - Per-backend query result cache with snapshot persistence
//! - [`EvidenceCrawler`], [`PatternMatcher`] - Fan-out search and proof extraction
//!
//! ## Scoring
//! - [`ProofFeatureExtractor`], [`EvidenceFeatureExtractor`] - Feature vectors
//! - [`ProofScorer`], [`EvidenceScorer`], [`LogisticModel`] - Trained models
//! - [`Evidence`], [`ComplexProof`], [`Verdict`] - Results
//!
//! ## Orchestration
//! - [`FactChecker`], [`CheckMode`] - End-to-end checks
//! - [`TrainingDataExporter`] - ARFF export of labelled feature vectors
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod crawl;
pub mod evidence;
pub mod export;
pub mod fact;
pub mod features;
pub mod hashing;
pub mod pipeline;
pub mod query;
pub mod scoring;
pub mod search;

pub use cache::{CacheError, CacheKey, CacheResult, CacheStats, EmptyResultPolicy, ResultCache};
pub use config::{BackendKind, Config, ConfigError};
pub use crawl::{CancellationFlag, CrawlConfig, EvidenceCrawler, PatternMatch, PatternMatcher};
pub use evidence::{ComplexProof, CrawlStats, Evidence, FeatureVector, Verdict};
pub use export::{ExportError, ExportResult, TrainingDataExporter, TrainingRow};
pub use fact::{Fact, Labels, Pattern, PatternError, PatternStore};
pub use features::{EvidenceFeatureExtractor, ProofFeatureExtractor};
pub use hashing::{hash_pattern_id, hash_query_key};
pub use pipeline::{CheckMode, FactChecker, FactCheckerBuilder, PipelineError, PipelineResult};
pub use query::{MetaQuery, QueryError, QueryGenerator};
#[cfg(any(test, feature = "mock"))]
pub use scoring::MockClassifier;
pub use scoring::{
    Classifier, EvidenceScorer, LogisticModel, ModelError, ProofScorer, TrainedModels,
};
#[cfg(any(test, feature = "mock"))]
pub use search::{MockFailure, MockSearchBackend};
pub use search::{
    BackendError, BackendResult, Document, ElasticBackend, SearchBackend, SearchResult,
    WebSearchBackend,
};
