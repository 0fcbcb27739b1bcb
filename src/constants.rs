//! Cross-cutting, shared constants.
//!
//! Component configs read their defaults from here so the env layer in
//! [`crate::config`] and the builders agree on the same values.

/// Maximum number of documents materialized per backend call.
pub const DEFAULT_NUMBER_OF_SEARCH_RESULTS: usize = 50;

/// Maximum number of patterns considered per (predicate, language).
pub const DEFAULT_MAX_PATTERNS_PER_PREDICATE: usize = 50;

/// Upper bound on in-flight worklist entries during a crawl.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Per backend call timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Longest token run a template placeholder may absorb.
pub const DEFAULT_MAX_PLACEHOLDER_TOKENS: usize = 5;

/// Max entries in the search result cache.
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Proof score at or above which a proof counts as confident.
pub const DEFAULT_PROOF_SCORE_THRESHOLD: f64 = 0.5;

/// Final score at or above which a fact is reported as supported.
pub const DEFAULT_SUPPORT_THRESHOLD: f64 = 0.5;

/// Phrase slop used for Elasticsearch `match_phrase` queries.
pub const ELASTIC_PHRASE_SLOP: u32 = 50;

/// Placeholder predicate: the pattern carries no predicate token.
pub const NO_PREDICATE_SENTINEL: &str = "??? NONE ???";

/// Template placeholder for the subject (domain) label.
pub const SUBJECT_PLACEHOLDER: &str = "?D?";

/// Template placeholder for the object (range) label.
pub const OBJECT_PLACEHOLDER: &str = "?R?";
