use std::sync::Arc;
use tracing::debug;

use super::classifier::Classifier;
use crate::evidence::{ComplexProof, Evidence};

/// Clamps a model output into `[0, 1]`; non-finite outputs become 0.
fn probability(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Applies the proof-level model.
#[derive(Debug, Clone)]
pub struct ProofScorer {
    model: Arc<dyn Classifier>,
}

impl ProofScorer {
    pub fn new(model: Arc<dyn Classifier>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    /// Probability that `proof` genuinely instantiates its fact.
    pub fn score(&self, proof: &ComplexProof) -> f64 {
        probability(self.model.predict(&proof.features))
    }

    /// Scores every proof of `evidence` in place.
    pub fn score_all(&self, evidence: &mut Evidence) {
        for proof in &mut evidence.proofs {
            proof.score = Some(self.score(proof));
        }
        debug!(
            model = self.model.name(),
            proofs = evidence.proofs.len(),
            "Scored proofs"
        );
    }
}

/// Applies the fact-level model.
#[derive(Debug, Clone)]
pub struct EvidenceScorer {
    model: Arc<dyn Classifier>,
}

impl EvidenceScorer {
    pub fn new(model: Arc<dyn Classifier>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    pub fn score(&self, evidence: &Evidence) -> f64 {
        probability(self.model.predict(&evidence.features))
    }

    /// Writes `final_score` once; skipped when there are no proofs.
    ///
    /// Returns the score written, or `None` when scoring was skipped.
    pub fn apply(&self, evidence: &mut Evidence) -> Option<f64> {
        if evidence.proofs.is_empty() {
            debug!(fact = %evidence.fact, "No proofs, leaving final score unset");
            return None;
        }
        if let Some(existing) = evidence.final_score {
            return Some(existing);
        }

        let score = self.score(evidence);
        evidence.final_score = Some(score);
        debug!(
            model = self.model.name(),
            fact = %evidence.fact,
            score,
            "Scored evidence"
        );
        Some(score)
    }
}
