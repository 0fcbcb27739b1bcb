use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::features::FeatureVector;
use super::proof::ComplexProof;
use crate::constants::DEFAULT_SUPPORT_THRESHOLD;
use crate::fact::Fact;

/// Counters collected while crawling one fact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    /// Worklist entries (queries) generated for the fact.
    pub queries: usize,
    /// (query, backend) calls dispatched, cache hits included; fewer than
    /// planned after cancellation.
    pub dispatched: usize,
    /// Network calls issued (cache hits excluded).
    pub backend_calls: usize,
    pub cache_hits: usize,
    pub failed_calls: usize,
    pub documents: usize,
    pub total_hit_count: u64,
    pub cancelled: bool,
}

impl CrawlStats {
    pub fn merge(&mut self, other: &CrawlStats) {
        self.queries += other.queries;
        self.dispatched += other.dispatched;
        self.backend_calls += other.backend_calls;
        self.cache_hits += other.cache_hits;
        self.failed_calls += other.failed_calls;
        self.documents += other.documents;
        self.total_hit_count += other.total_hit_count;
        self.cancelled |= other.cancelled;
    }
}

/// Everything found and computed for one fact.
#[derive(Debug, Clone, Serialize)]
pub struct Evidence {
    pub fact: Fact,
    /// Ordered by pattern naturalness, document rank, then discovery order.
    pub proofs: Vec<ComplexProof>,
    pub features: FeatureVector,
    /// Set only by the evidence scorer, and only when proofs exist.
    pub final_score: Option<f64>,
    pub stats: CrawlStats,
}

impl Evidence {
    /// Evidence with no queries run and no proofs.
    pub fn unchecked(fact: Fact) -> Self {
        Self {
            fact,
            proofs: Vec::new(),
            features: FeatureVector::new(),
            final_score: None,
            stats: CrawlStats::default(),
        }
    }

    pub fn has_proofs(&self) -> bool {
        !self.proofs.is_empty()
    }

    /// Languages with at least one proof.
    pub fn languages_with_proofs(&self) -> BTreeSet<&str> {
        self.proofs.iter().map(|p| p.language.as_str()).collect()
    }

    pub fn verdict(&self) -> Verdict {
        match self.final_score {
            Some(score) if score >= DEFAULT_SUPPORT_THRESHOLD => Verdict::Supported { score },
            Some(score) => Verdict::Unsupported { score },
            None if self.stats.queries == 0 => Verdict::NotChecked,
            None if self.proofs.is_empty() => Verdict::InsufficientEvidence,
            None => Verdict::NotScored,
        }
    }
}

/// Caller-facing outcome of a fact check.
///
/// "Could not check" outcomes carry no score, so they can never be mistaken
/// for a low-confidence result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Scored at or above the support threshold.
    Supported { score: f64 },
    /// Scored below the support threshold.
    Unsupported { score: f64 },
    /// Queries ran but no proof was found.
    InsufficientEvidence,
    /// No query could be generated for any language.
    NotChecked,
    /// Proofs exist but the final scoring stage was skipped.
    NotScored,
}

impl Verdict {
    pub fn is_supported(&self) -> bool {
        matches!(self, Verdict::Supported { .. })
    }

    /// `true` when a final score exists.
    pub fn is_scored(&self) -> bool {
        self.score().is_some()
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            Verdict::Supported { score } | Verdict::Unsupported { score } => Some(*score),
            _ => None,
        }
    }

    pub fn debug_status(&self) -> &'static str {
        match self {
            Verdict::Supported { .. } => "SUPPORTED",
            Verdict::Unsupported { .. } => "UNSUPPORTED",
            Verdict::InsufficientEvidence => "INSUFFICIENT_EVIDENCE",
            Verdict::NotChecked => "NOT_CHECKED",
            Verdict::NotScored => "NOT_SCORED",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Supported { score } | Verdict::Unsupported { score } => {
                write!(f, "{} (score: {:.4})", self.debug_status(), score)
            }
            _ => write!(f, "{}", self.debug_status()),
        }
    }
}
