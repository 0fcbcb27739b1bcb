//! Feature names shared by the extractors, the model artifacts and the
//! training-data export.

// Proof level
pub const SUBJECT_SIMILARITY: &str = "subject_similarity";
pub const OBJECT_SIMILARITY: &str = "object_similarity";
pub const DOCUMENT_RANK: &str = "document_rank";
pub const PATTERN_NATURALNESS: &str = "pattern_naturalness";
pub const LANGUAGE_MATCH: &str = "language_match";
pub const TOKEN_DISTANCE: &str = "token_distance";
pub const SENTENCE_LENGTH: &str = "sentence_length";
pub const TITLE_MATCH: &str = "title_match";
pub const EXPLICIT_PREDICATE: &str = "explicit_predicate";

pub const PROOF_FEATURES: &[&str] = &[
    SUBJECT_SIMILARITY,
    OBJECT_SIMILARITY,
    DOCUMENT_RANK,
    PATTERN_NATURALNESS,
    LANGUAGE_MATCH,
    TOKEN_DISTANCE,
    SENTENCE_LENGTH,
    TITLE_MATCH,
    EXPLICIT_PREDICATE,
];

// Evidence level
pub const TOTAL_PROOFS: &str = "total_proofs";
pub const DISTINCT_DOCUMENTS: &str = "distinct_documents";
pub const DISTINCT_DOMAINS: &str = "distinct_domains";
pub const MEAN_PROOF_SCORE: &str = "mean_proof_score";
pub const MAX_PROOF_SCORE: &str = "max_proof_score";
pub const PROOF_SCORE_VARIANCE: &str = "proof_score_variance";
pub const PROOFS_ABOVE_THRESHOLD: &str = "proofs_above_threshold";
pub const LANGUAGE_COVERAGE: &str = "language_coverage";
pub const DISTINCT_PATTERNS: &str = "distinct_patterns";
pub const LOG_TOTAL_HIT_COUNT: &str = "log_total_hit_count";

pub const EVIDENCE_FEATURES: &[&str] = &[
    TOTAL_PROOFS,
    DISTINCT_DOCUMENTS,
    DISTINCT_DOMAINS,
    MEAN_PROOF_SCORE,
    MAX_PROOF_SCORE,
    PROOF_SCORE_VARIANCE,
    PROOFS_ABOVE_THRESHOLD,
    LANGUAGE_COVERAGE,
    DISTINCT_PATTERNS,
    LOG_TOTAL_HIT_COUNT,
];
