use super::*;
use crate::cache::ResultCache;
use crate::config::Config;
use crate::crawl::CancellationFlag;
use crate::evidence::Verdict;
use crate::fact::{Fact, Pattern, PatternStore};
use crate::features::names::{MEAN_PROOF_SCORE, SUBJECT_SIMILARITY};
use crate::scoring::{MockClassifier, TrainedModels};
use crate::search::{Document, MockFailure, MockSearchBackend, SearchBackend};
use std::sync::Arc;

fn create_test_patterns() -> Arc<PatternStore> {
    Arc::new(PatternStore::from_patterns([
        Pattern::new("en", "dbo:birthPlace", "?D? was born in ?R?", 0.9),
        Pattern::new("de", "dbo:birthPlace", "?D? wurde in ?R? geboren", 0.8),
    ]))
}

fn create_test_models() -> TrainedModels {
    TrainedModels::new(
        Arc::new(MockClassifier::feature(SUBJECT_SIMILARITY)),
        Arc::new(MockClassifier::feature(MEAN_PROOF_SCORE)),
    )
}

fn einstein() -> Fact {
    Fact::new("dbr:Albert_Einstein", "dbo:birthPlace", "dbr:Ulm")
        .with_labels("en", "Einstein", "Ulm")
        .with_ground_truth(true)
}

fn born_in_ulm() -> Arc<MockSearchBackend> {
    Arc::new(MockSearchBackend::new("mock").with_default_documents(vec![Document::new(
        "https://en.wikipedia.org/wiki/Albert_Einstein",
        "Albert Einstein",
        "Albert Einstein was a physicist. Einstein was born in Ulm in 1879.",
        1.0,
        "en",
    )]))
}

fn create_test_checker(backend: Arc<MockSearchBackend>) -> FactChecker {
    FactChecker::builder()
        .patterns(create_test_patterns())
        .models(create_test_models())
        .backend(backend as Arc<dyn SearchBackend>)
        .build()
        .unwrap()
}

#[test]
fn test_builder_requires_patterns_and_models() {
    let missing_patterns = FactChecker::builder().models(create_test_models()).build();
    assert!(matches!(
        missing_patterns,
        Err(PipelineError::MissingComponent { name: "patterns" })
    ));

    let missing_models = FactChecker::builder().patterns(create_test_patterns()).build();
    assert!(matches!(
        missing_models,
        Err(PipelineError::MissingComponent { name: "models" })
    ));
}

#[tokio::test]
async fn test_full_check_is_supported() {
    let checker = create_test_checker(born_in_ulm());

    let evidence = checker.check_fact(&einstein(), CheckMode::Full).await;

    assert!(evidence.has_proofs());
    assert!(evidence.proofs.iter().all(|p| p.score == Some(1.0)));
    assert_eq!(evidence.features.get(MEAN_PROOF_SCORE), 1.0);
    assert_eq!(evidence.verdict(), Verdict::Supported { score: 1.0 });
}

#[tokio::test]
async fn test_crawl_only_skips_scoring() {
    let checker = create_test_checker(born_in_ulm());

    let evidence = checker.check_fact(&einstein(), CheckMode::CrawlOnly).await;

    assert!(evidence.has_proofs());
    assert!(evidence.proofs.iter().all(|p| p.features.is_empty() && p.score.is_none()));
    assert!(evidence.features.is_empty());
    assert_eq!(evidence.verdict(), Verdict::NotScored);
}

#[tokio::test]
async fn test_fact_without_labels_is_not_checked() {
    let backend = born_in_ulm();
    let checker = create_test_checker(backend.clone());
    let fact =
        Fact::new("dbr:Albert_Einstein", "dbo:birthPlace", "dbr:Ulm").with_labels("en", "", "Ulm");

    let evidence = checker.check_fact(&fact, CheckMode::Full).await;

    assert_eq!(evidence.verdict(), Verdict::NotChecked);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_failing_backend_gives_insufficient_evidence() {
    let backend = Arc::new(MockSearchBackend::new("down").with_failure(MockFailure::Unavailable));
    let checker = create_test_checker(backend);

    let evidence = checker.check_fact(&einstein(), CheckMode::Full).await;

    assert_eq!(evidence.stats.failed_calls, 1);
    assert_eq!(evidence.verdict(), Verdict::InsufficientEvidence);
    assert!(evidence.final_score.is_none());
}

#[tokio::test]
async fn test_training_mode_leaves_final_score_unset() {
    let checker = FactChecker::builder()
        .patterns(create_test_patterns())
        .models(create_test_models())
        .backend(born_in_ulm())
        .training_mode(true)
        .build()
        .unwrap();

    let evidence = checker.check_fact(&einstein(), CheckMode::Full).await;

    assert!(checker.training_mode());
    assert!(!checker.exports_training_data());
    assert!(!evidence.features.is_empty());
    assert!(evidence.final_score.is_none());
    assert_eq!(evidence.verdict(), Verdict::NotScored);
}

#[tokio::test]
async fn test_check_facts_exports_training_rows() {
    let dir = tempfile::tempdir().unwrap();
    let proofs = dir.path().join("proofs.arff");
    let facts = dir.path().join("facts.arff");

    let checker = FactChecker::builder()
        .patterns(create_test_patterns())
        .models(create_test_models())
        .backend(born_in_ulm())
        .training_mode(true)
        .training_files(Some(proofs.clone()), Some(facts.clone()))
        .build()
        .unwrap();
    assert!(checker.exports_training_data());

    let results = checker
        .check_facts(&[einstein(), einstein().with_ground_truth(false)], CheckMode::Full)
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(checker.exporter().evidence_rows(), 2);
    let written = std::fs::read_to_string(&facts).unwrap();
    assert!(written.contains("@RELATION factcheck_evidence"));
    assert!(written.trim_end().ends_with("false"));
    assert!(proofs.exists());
}

#[tokio::test]
async fn test_cancelled_batch_stops_early() {
    let checker = create_test_checker(born_in_ulm());
    let cancel = CancellationFlag::new();
    cancel.cancel();

    let results = checker
        .check_facts_with_cancel(&[einstein(), einstein()], CheckMode::Full, &cancel)
        .await;

    assert!(results.is_empty());
}

#[tokio::test]
async fn test_repeated_check_hits_cache() {
    let backend = born_in_ulm();
    let checker = create_test_checker(backend.clone());

    let first = checker.check_fact(&einstein(), CheckMode::Full).await;
    let second = checker.check_fact(&einstein(), CheckMode::Full).await;

    assert_eq!(backend.call_count(), 1);
    assert_eq!(second.stats.cache_hits, 1);
    assert_eq!(first.final_score, second.final_score);
}

#[test]
fn test_persist_cache_without_path() {
    let checker = create_test_checker(born_in_ulm());
    assert_eq!(checker.persist_cache().unwrap(), None);
}

#[test]
fn test_from_config_missing_patterns() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_data_dir(dir.path().to_path_buf());

    assert!(matches!(
        FactChecker::from_config(&config),
        Err(PipelineError::Patterns(_))
    ));
}

#[tokio::test]
async fn test_from_config_round_trips_cache_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::with_data_dir(dir.path().to_path_buf());
    std::fs::write(
        &config.patterns_path,
        r#"[{"language": "en", "predicate": "dbo:birthPlace", "template": "?D? was born in ?R?", "naturalness": 0.9}]"#,
    )
    .unwrap();
    std::fs::create_dir_all(dir.path().join("models")).unwrap();
    std::fs::write(&config.proof_model_path, r#"{"name": "proof"}"#).unwrap();
    std::fs::write(&config.evidence_model_path, r#"{"name": "evidence"}"#).unwrap();
    config.cache_snapshot_path = Some(dir.path().join("cache.json"));

    let checker = FactChecker::from_config(&config).unwrap();
    assert_eq!(checker.generator().patterns().len(), 1);
    assert_eq!(checker.persist_cache().unwrap(), Some(0));

    // A corrupt snapshot is ignored rather than fatal.
    std::fs::write(dir.path().join("cache.json"), b"{broken").unwrap();
    assert!(FactChecker::from_config(&config).is_ok());
}

#[test]
fn test_shared_cache_is_used() {
    let cache = Arc::new(ResultCache::new());
    let checker = FactChecker::builder()
        .patterns(create_test_patterns())
        .models(create_test_models())
        .cache(cache.clone())
        .build()
        .unwrap();

    assert!(Arc::ptr_eq(checker.crawler().cache(), &cache));
}
