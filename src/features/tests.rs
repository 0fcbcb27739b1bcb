use super::names::*;
use super::*;
use crate::evidence::{ComplexProof, Evidence, FeatureVector};
use crate::fact::{Fact, Pattern};
use crate::search::Document;
use std::sync::Arc;

fn einstein() -> Fact {
    Fact::new("dbr:Albert_Einstein", "dbo:birthPlace", "dbr:Ulm")
        .with_labels("en", "Einstein", "Ulm")
        .with_labels("de", "Einstein", "Ulm")
}

fn proof_with(url: &str, subject: &str, object: &str, score: Option<f64>) -> ComplexProof {
    ComplexProof {
        document: Arc::new(Document::new(url, "Albert Einstein", "text", 0.8, "en")),
        pattern: Arc::new(Pattern::new("en", "dbo:birthPlace", "?D? was born in ?R?", 0.9)),
        language: "en".to_string(),
        sentence: format!("{} was born in {}", subject, object),
        sentence_span: 0..10,
        subject_surface: subject.to_string(),
        object_surface: object.to_string(),
        subject_tokens: Some(0..1),
        object_tokens: Some(4..5),
        sentence_tokens: 5,
        features: FeatureVector::new(),
        score,
    }
}

#[test]
fn test_similarity_identical_case_insensitive() {
    assert_eq!(similarity("Einstein", "einstein"), 1.0);
    assert_eq!(similarity("  Ulm ", "ULM"), 1.0);
}

#[test]
fn test_similarity_partial() {
    // one substitution over four chars
    assert!((similarity("Ulm.", "Ulmx") - 0.75).abs() < 1e-9);
    assert_eq!(levenshtein("kitten", "sitting"), 3);
    assert_eq!(levenshtein("", "abc"), 3);
}

#[test]
fn test_similarity_empty_is_zero() {
    assert_eq!(similarity("", "Ulm"), 0.0);
    assert_eq!(similarity("Ulm", "   "), 0.0);
}

#[test]
fn test_similarity_unicode() {
    assert_eq!(similarity("München", "MÜNCHEN"), 1.0);
    assert!((similarity("Munchen", "München") - (1.0 - 1.0 / 7.0)).abs() < 1e-9);
}

#[test]
fn test_best_label_similarity_is_symmetric() {
    // passive voice: subject slot holds the object label
    assert_eq!(best_label_similarity("Ulm", "Einstein", "Ulm"), 1.0);
    assert_eq!(best_label_similarity("Einstein", "Einstein", "Ulm"), 1.0);
}

#[test]
fn test_proof_features_for_exact_match() {
    let fact = einstein();
    let mut proof = proof_with("https://en.wikipedia.org/wiki/Einstein", "Einstein", "Ulm", None);
    ProofFeatureExtractor::new().extract(&mut proof, &fact);

    let f = &proof.features;
    assert_eq!(f.get(SUBJECT_SIMILARITY), 1.0);
    assert_eq!(f.get(OBJECT_SIMILARITY), 1.0);
    assert_eq!(f.get(DOCUMENT_RANK), 0.8);
    assert_eq!(f.get(PATTERN_NATURALNESS), 0.9);
    assert_eq!(f.get(LANGUAGE_MATCH), 1.0);
    assert_eq!(f.get(TOKEN_DISTANCE), 3.0);
    assert_eq!(f.get(SENTENCE_LENGTH), 5.0);
    assert_eq!(f.get(TITLE_MATCH), 1.0);
    assert_eq!(f.get(EXPLICIT_PREDICATE), 1.0);
    for name in PROOF_FEATURES {
        assert!(f.contains(name), "missing {}", name);
    }
}

#[test]
fn test_proof_features_degrade_to_zero() {
    let fact = Fact::new("dbr:A", "dbo:birthPlace", "dbr:B").with_language("en");
    let mut proof = proof_with("https://example.org", "", "Ulm", None);
    ProofFeatureExtractor::new().extract(&mut proof, &fact);

    assert_eq!(proof.features.get(SUBJECT_SIMILARITY), 0.0);
    assert_eq!(proof.features.get(OBJECT_SIMILARITY), 0.0);
    assert_eq!(proof.features.get(TITLE_MATCH), 0.0);
}

#[test]
fn test_proof_features_language_mismatch() {
    let fact = einstein();
    let mut proof = proof_with("https://example.org", "Einstein", "Ulm", None);
    proof.language = "de".to_string();
    ProofFeatureExtractor::new().extract(&mut proof, &fact);

    assert_eq!(proof.features.get(LANGUAGE_MATCH), 0.0);
    assert_eq!(proof.features.get(SUBJECT_SIMILARITY), 1.0);
}

#[test]
fn test_sentinel_pattern_has_no_explicit_predicate() {
    let fact = einstein();
    let mut proof = proof_with("https://example.org", "Einstein", "Ulm", None);
    proof.pattern = Arc::new(Pattern::new("en", "dbo:birthPlace", "??? NONE ???", 0.1));
    ProofFeatureExtractor::new().extract(&mut proof, &fact);

    assert_eq!(proof.features.get(EXPLICIT_PREDICATE), 0.0);
}

#[test]
fn test_evidence_mean_and_threshold() {
    let mut evidence = Evidence::unchecked(einstein());
    evidence.proofs.push(proof_with("https://a.org/1", "Einstein", "Ulm", Some(0.9)));
    evidence.proofs.push(proof_with("https://b.org/2", "Einstein", "Ulm", Some(0.3)));
    EvidenceFeatureExtractor::new(0.5).extract(&mut evidence);

    let f = &evidence.features;
    assert!((f.get(MEAN_PROOF_SCORE) - 0.6).abs() < 1e-9);
    assert_eq!(f.get(MAX_PROOF_SCORE), 0.9);
    assert!((f.get(PROOF_SCORE_VARIANCE) - 0.09).abs() < 1e-9);
    assert_eq!(f.get(PROOFS_ABOVE_THRESHOLD), 1.0);
    assert_eq!(f.get(TOTAL_PROOFS), 2.0);
    for name in EVIDENCE_FEATURES {
        assert!(f.contains(name), "missing {}", name);
    }
}

#[test]
fn test_evidence_distinct_counts() {
    let mut evidence = Evidence::unchecked(einstein());
    evidence.proofs.push(proof_with("https://www.a.org/1", "Einstein", "Ulm", Some(0.5)));
    evidence.proofs.push(proof_with("https://a.org/2", "Einstein", "Ulm", Some(0.5)));
    evidence.proofs.push(proof_with("https://a.org/2", "Einstein", "Ulm", Some(0.5)));
    evidence.proofs.push(proof_with("https://b.org/3", "Einstein", "Ulm", Some(0.5)));
    EvidenceFeatureExtractor::default().extract(&mut evidence);

    assert_eq!(evidence.features.get(DISTINCT_DOCUMENTS), 3.0);
    assert_eq!(evidence.features.get(DISTINCT_DOMAINS), 2.0);
    assert_eq!(evidence.features.get(DISTINCT_PATTERNS), 1.0);
}

#[test]
fn test_evidence_language_coverage() {
    let mut evidence = Evidence::unchecked(einstein());
    evidence.proofs.push(proof_with("https://a.org/1", "Einstein", "Ulm", Some(0.7)));
    EvidenceFeatureExtractor::default().extract(&mut evidence);

    assert_eq!(evidence.features.get(LANGUAGE_COVERAGE), 0.5);
}

#[test]
fn test_evidence_hit_count_is_log_scaled() {
    let mut evidence = Evidence::unchecked(einstein());
    evidence.stats.total_hit_count = 99;
    EvidenceFeatureExtractor::default().extract(&mut evidence);

    assert!((evidence.features.get(LOG_TOTAL_HIT_COUNT) - 100f64.ln()).abs() < 1e-9);
}

#[test]
fn test_evidence_without_scores() {
    let mut evidence = Evidence::unchecked(einstein());
    evidence.proofs.push(proof_with("https://a.org/1", "Einstein", "Ulm", None));
    EvidenceFeatureExtractor::default().extract(&mut evidence);

    assert_eq!(evidence.features.get(MEAN_PROOF_SCORE), 0.0);
    assert_eq!(evidence.features.get(MAX_PROOF_SCORE), 0.0);
    assert_eq!(evidence.features.get(TOTAL_PROOFS), 1.0);
}

#[test]
fn test_mean_is_monotone_under_higher_scoring_proof() {
    let mut scores = vec![0.4, 0.7, 0.2];
    let before = ScoreStats::from_scores(&scores).mean;
    let max = scores.iter().copied().fold(0.0, f64::max);

    scores.push(max + 0.1);
    let after = ScoreStats::from_scores(&scores).mean;
    assert!(after >= before);
}
