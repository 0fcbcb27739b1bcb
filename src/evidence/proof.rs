use serde::Serialize;
use std::ops::Range;
use std::sync::Arc;

use super::features::FeatureVector;
use crate::fact::Pattern;
use crate::search::Document;

/// A sentence in a crawled document that instantiates a pattern.
///
/// Created by the crawler; the feature and scoring stages fill in
/// `features` and `score`.
#[derive(Debug, Clone, Serialize)]
pub struct ComplexProof {
    pub document: Arc<Document>,
    pub pattern: Arc<Pattern>,
    /// Language of the query that surfaced the document.
    pub language: String,
    pub sentence: String,
    /// Byte range of `sentence` within `document.text`.
    pub sentence_span: Range<usize>,
    pub subject_surface: String,
    pub object_surface: String,
    /// Token ranges of the surfaces within the sentence.
    pub subject_tokens: Option<Range<usize>>,
    pub object_tokens: Option<Range<usize>>,
    pub sentence_tokens: usize,
    pub features: FeatureVector,
    pub score: Option<f64>,
}

impl ComplexProof {
    /// Tokens strictly between the two surfaces (0 when adjacent or unknown).
    pub fn token_distance(&self) -> usize {
        match (&self.subject_tokens, &self.object_tokens) {
            (Some(s), Some(o)) if s.end <= o.start => o.start - s.end,
            (Some(s), Some(o)) if o.end <= s.start => s.start - o.end,
            _ => 0,
        }
    }

    /// Score, or `0.0` before scoring.
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}
