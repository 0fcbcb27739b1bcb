use std::collections::HashSet;
use tracing::debug;

use super::names::*;
use crate::constants::DEFAULT_PROOF_SCORE_THRESHOLD;
use crate::evidence::Evidence;

/// Aggregates the scored proofs of an [`Evidence`] into fact-level features.
///
/// Score statistics range over proofs that carry a score; unscored proofs
/// still count towards document, domain, pattern and language coverage.
#[derive(Debug, Clone, Copy)]
pub struct EvidenceFeatureExtractor {
    threshold: f64,
}

impl Default for EvidenceFeatureExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_PROOF_SCORE_THRESHOLD)
    }
}

impl EvidenceFeatureExtractor {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn extract(&self, evidence: &mut Evidence) {
        let proofs = &evidence.proofs;

        let documents: HashSet<&str> = proofs.iter().map(|p| p.document.url.as_str()).collect();
        let domains: HashSet<String> = proofs.iter().filter_map(|p| p.document.domain()).collect();
        let patterns: HashSet<u64> = proofs.iter().map(|p| p.pattern.id()).collect();

        let scores: Vec<f64> = proofs.iter().filter_map(|p| p.score).collect();
        let stats = ScoreStats::from_scores(&scores);
        let above = scores.iter().filter(|s| **s >= self.threshold).count();

        let declared = evidence.fact.language_count();
        let covered = evidence
            .languages_with_proofs()
            .into_iter()
            .filter(|lang| evidence.fact.declares_language(lang))
            .count();
        let coverage = if declared == 0 {
            0.0
        } else {
            covered as f64 / declared as f64
        };

        let total_hits = evidence.stats.total_hit_count as f64;

        let features = &mut evidence.features;
        features.set(TOTAL_PROOFS, proofs.len() as f64);
        features.set(DISTINCT_DOCUMENTS, documents.len() as f64);
        features.set(DISTINCT_DOMAINS, domains.len() as f64);
        features.set(MEAN_PROOF_SCORE, stats.mean);
        features.set(MAX_PROOF_SCORE, stats.max);
        features.set(PROOF_SCORE_VARIANCE, stats.variance);
        features.set(PROOFS_ABOVE_THRESHOLD, above as f64);
        features.set(LANGUAGE_COVERAGE, coverage);
        features.set(DISTINCT_PATTERNS, patterns.len() as f64);
        features.set(LOG_TOTAL_HIT_COUNT, total_hits.ln_1p());

        debug!(
            fact = %evidence.fact,
            proofs = proofs.len(),
            mean_score = stats.mean,
            coverage,
            "Extracted evidence features"
        );
    }
}

/// Mean, max and population variance of proof scores (all 0 when empty).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreStats {
    pub mean: f64,
    pub max: f64,
    pub variance: f64,
}

impl ScoreStats {
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }

        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean,
            max,
            variance,
        }
    }
}
