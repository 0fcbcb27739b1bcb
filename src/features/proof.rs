use tracing::trace;

use super::names::*;
use super::similarity::best_label_similarity;
use crate::evidence::{ComplexProof, Evidence};
use crate::fact::Fact;

/// Computes the proof-level feature vector.
///
/// Missing inputs (no labels for the proof's language, empty surfaces) yield
/// 0-valued features rather than errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProofFeatureExtractor;

impl ProofFeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, proof: &mut ComplexProof, fact: &Fact) {
        let subject_label = fact.subject_label(&proof.language).unwrap_or_default();
        let object_label = fact.object_label(&proof.language).unwrap_or_default();

        let subject_similarity =
            best_label_similarity(&proof.subject_surface, subject_label, object_label);
        let object_similarity =
            best_label_similarity(&proof.object_surface, subject_label, object_label);

        let language_match = !proof.document.language.is_empty()
            && proof.document.language.eq_ignore_ascii_case(&proof.language);

        let title = proof.document.title.to_lowercase();
        let title_match = [subject_label, object_label]
            .iter()
            .map(|label| label.trim().to_lowercase())
            .any(|label| !label.is_empty() && title.contains(&label));

        let token_distance = proof.token_distance() as f64;

        let features = &mut proof.features;
        features.set(SUBJECT_SIMILARITY, subject_similarity);
        features.set(OBJECT_SIMILARITY, object_similarity);
        features.set(DOCUMENT_RANK, proof.document.rank);
        features.set(PATTERN_NATURALNESS, proof.pattern.naturalness());
        features.set(LANGUAGE_MATCH, indicator(language_match));
        features.set(TOKEN_DISTANCE, token_distance);
        features.set(SENTENCE_LENGTH, proof.sentence_tokens as f64);
        features.set(TITLE_MATCH, indicator(title_match));
        features.set(EXPLICIT_PREDICATE, indicator(!proof.pattern.is_sentinel()));

        trace!(
            url = %proof.document.url,
            subject_similarity,
            object_similarity,
            "Extracted proof features"
        );
    }

    /// Extracts features for every proof of `evidence`.
    pub fn extract_all(&self, evidence: &mut Evidence) {
        let fact = &evidence.fact;
        for proof in &mut evidence.proofs {
            self.extract(proof, fact);
        }
    }
}

#[inline]
fn indicator(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}
