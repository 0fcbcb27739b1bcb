//! Feature extraction for both scoring stages.
//!
//! [`ProofFeatureExtractor`] describes a single proof (surface similarity,
//! rank, naturalness, language); [`EvidenceFeatureExtractor`] aggregates the
//! already-scored proofs of a fact. Names live in [`names`] so model artifacts
//! and training exports agree on them.

pub mod evidence;
pub mod names;
pub mod proof;
pub mod similarity;

#[cfg(test)]
mod tests;

pub use evidence::{EvidenceFeatureExtractor, ScoreStats};
pub use proof::ProofFeatureExtractor;
pub use similarity::{best_label_similarity, levenshtein, similarity};
