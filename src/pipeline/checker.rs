use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::error::{PipelineError, PipelineResult};
use crate::cache::{CacheResult, ResultCache};
use crate::config::Config;
use crate::constants::{DEFAULT_MAX_PATTERNS_PER_PREDICATE, DEFAULT_PROOF_SCORE_THRESHOLD};
use crate::crawl::{CancellationFlag, CrawlConfig, EvidenceCrawler};
use crate::evidence::Evidence;
use crate::export::TrainingDataExporter;
use crate::fact::{Fact, PatternStore};
use crate::features::{EvidenceFeatureExtractor, ProofFeatureExtractor};
use crate::query::QueryGenerator;
use crate::scoring::{EvidenceScorer, ProofScorer, TrainedModels};
use crate::search::{SearchBackend, build_search_backends};

/// How far a fact check runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckMode {
    /// Query, crawl, extract features and score.
    #[default]
    Full,
    /// Stop after crawling; proofs carry no features or scores.
    CrawlOnly,
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// End-to-end fact checking: queries, crawl, both feature/scoring stages.
pub struct FactChecker {
    generator: QueryGenerator,
    crawler: EvidenceCrawler,
    proof_features: ProofFeatureExtractor,
    evidence_features: EvidenceFeatureExtractor,
    proof_scorer: ProofScorer,
    evidence_scorer: EvidenceScorer,
    exporter: TrainingDataExporter,
    training_mode: bool,
    proof_training_file: Option<PathBuf>,
    evidence_training_file: Option<PathBuf>,
    cache_snapshot_path: Option<PathBuf>,
}

impl FactChecker {
    pub fn builder() -> FactCheckerBuilder {
        FactCheckerBuilder::default()
    }

    /// Validates `config` and loads patterns, models, backends and the cache
    /// snapshot. Any missing artifact is fatal; a bad snapshot is not.
    pub fn from_config(config: &Config) -> PipelineResult<Self> {
        config.validate()?;

        let patterns = PatternStore::load(&config.patterns_path)?;
        info!(patterns = patterns.len(), "Loaded pattern inventory");
        let models = TrainedModels::load(config)?;
        let backends = build_search_backends(config)?;

        let cache = ResultCache::with_capacity(config.cache_capacity)
            .with_empty_policy(config.empty_result_policy);
        if let Some(path) = config.cache_snapshot_path.as_deref().filter(|p| p.exists()) {
            match cache.load_snapshot(path) {
                Ok(entries) => info!(entries, path = %path.display(), "Restored result cache"),
                Err(e) => warn!(error = %e, "Ignoring unreadable cache snapshot"),
            }
        }

        Self::builder()
            .with_config(config)
            .patterns(Arc::new(patterns))
            .models(models)
            .backends(backends)
            .cache(Arc::new(cache))
            .build()
    }

    pub fn generator(&self) -> &QueryGenerator {
        &self.generator
    }

    pub fn crawler(&self) -> &EvidenceCrawler {
        &self.crawler
    }

    pub fn exporter(&self) -> &TrainingDataExporter {
        &self.exporter
    }

    pub fn training_mode(&self) -> bool {
        self.training_mode
    }

    pub async fn check_fact(&self, fact: &Fact, mode: CheckMode) -> Evidence {
        self.check_fact_with_cancel(fact, mode, &CancellationFlag::new())
            .await
    }

    /// Runs the pipeline for one fact. Never fails; see [`Evidence::verdict`].
    #[instrument(skip_all, fields(fact = %fact, mode = ?mode))]
    pub async fn check_fact_with_cancel(
        &self,
        fact: &Fact,
        mode: CheckMode,
        cancel: &CancellationFlag,
    ) -> Evidence {
        let total = Instant::now();

        let start = Instant::now();
        let queries = self.generator.generate_all(fact);
        info!(queries = queries.len(), elapsed_ms = elapsed_ms(start), "Generated queries");
        if queries.is_empty() {
            warn!("No queries could be generated for any language");
            return Evidence::unchecked(fact.clone());
        }

        let start = Instant::now();
        let mut evidence = self
            .crawler
            .crawl_evidence_with_cancel(fact, &queries, cancel)
            .await;
        info!(
            proofs = evidence.proofs.len(),
            elapsed_ms = elapsed_ms(start),
            "Crawled evidence"
        );
        if mode == CheckMode::CrawlOnly {
            return evidence;
        }

        let start = Instant::now();
        self.proof_features.extract_all(&mut evidence);
        info!(elapsed_ms = elapsed_ms(start), "Extracted proof features");

        let start = Instant::now();
        self.proof_scorer.score_all(&mut evidence);
        info!(elapsed_ms = elapsed_ms(start), "Scored proofs");

        let start = Instant::now();
        self.evidence_features.extract(&mut evidence);
        info!(elapsed_ms = elapsed_ms(start), "Extracted evidence features");

        if self.training_mode {
            debug!("Training mode, skipping evidence scoring");
        } else {
            let start = Instant::now();
            self.evidence_scorer.apply(&mut evidence);
            info!(elapsed_ms = elapsed_ms(start), "Scored evidence");
        }

        info!(
            verdict = %evidence.verdict(),
            elapsed_ms = elapsed_ms(total),
            "Fact checked"
        );
        evidence
    }

    /// Checks facts one after another, recording training rows after each and
    /// rewriting the export files when they are configured.
    pub async fn check_facts(&self, facts: &[Fact], mode: CheckMode) -> Vec<Evidence> {
        self.check_facts_with_cancel(facts, mode, &CancellationFlag::new())
            .await
    }

    /// Like [`check_facts`](Self::check_facts), but stops before the next
    /// fact once `cancel` is set. The fact in flight keeps what it crawled.
    pub async fn check_facts_with_cancel(
        &self,
        facts: &[Fact],
        mode: CheckMode,
        cancel: &CancellationFlag,
    ) -> Vec<Evidence> {
        let mut results = Vec::with_capacity(facts.len());
        for (i, fact) in facts.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(remaining = facts.len() - i, "Cancelled, skipping remaining facts");
                break;
            }
            let evidence = self.check_fact_with_cancel(fact, mode, cancel).await;
            info!(
                index = i + 1,
                total = facts.len(),
                fact = %fact,
                verdict = %evidence.verdict(),
                "Checked fact"
            );

            if mode == CheckMode::Full {
                self.exporter.record(&evidence);
                if self.exports_training_data() {
                    self.write_training_files();
                }
            }
            results.push(evidence);
        }
        results
    }

    pub fn exports_training_data(&self) -> bool {
        self.proof_training_file.is_some() || self.evidence_training_file.is_some()
    }

    fn write_training_files(&self) {
        if let Some(path) = &self.proof_training_file
            && let Err(e) = self.exporter.write_proof_arff(path)
        {
            warn!(error = %e, "Failed to write proof training data");
        }
        if let Some(path) = &self.evidence_training_file
            && let Err(e) = self.exporter.write_evidence_arff(path)
        {
            warn!(error = %e, "Failed to write evidence training data");
        }
    }

    /// Saves the result cache snapshot when a path is configured.
    ///
    /// Returns the number of entries written, or `None` without a path.
    pub fn persist_cache(&self) -> CacheResult<Option<usize>> {
        let Some(path) = &self.cache_snapshot_path else {
            return Ok(None);
        };
        let entries = self.crawler.cache().save_snapshot(path)?;
        info!(entries, path = %path.display(), "Saved result cache");
        Ok(Some(entries))
    }
}

/// Assembles a [`FactChecker`] from parts.
///
/// Patterns and models are required; everything else has defaults.
#[derive(Default)]
pub struct FactCheckerBuilder {
    patterns: Option<Arc<PatternStore>>,
    models: Option<TrainedModels>,
    backends: Vec<Arc<dyn SearchBackend>>,
    cache: Option<Arc<ResultCache>>,
    crawl: CrawlConfig,
    max_patterns: Option<usize>,
    proof_score_threshold: Option<f64>,
    training_mode: bool,
    proof_training_file: Option<PathBuf>,
    evidence_training_file: Option<PathBuf>,
    cache_snapshot_path: Option<PathBuf>,
}

impl FactCheckerBuilder {
    /// Copies every tunable from `config` (but loads nothing).
    pub fn with_config(mut self, config: &Config) -> Self {
        self.crawl = CrawlConfig::from_config(config);
        self.max_patterns = Some(config.max_patterns_per_predicate);
        self.proof_score_threshold = Some(config.proof_score_threshold);
        self.training_mode = config.training_mode;
        self.proof_training_file = config.proof_training_file.clone();
        self.evidence_training_file = config.evidence_training_file.clone();
        self.cache_snapshot_path = config.cache_snapshot_path.clone();
        self
    }

    pub fn patterns(mut self, patterns: Arc<PatternStore>) -> Self {
        self.patterns = Some(patterns);
        self
    }

    pub fn models(mut self, models: TrainedModels) -> Self {
        self.models = Some(models);
        self
    }

    pub fn backends(mut self, backends: Vec<Arc<dyn SearchBackend>>) -> Self {
        self.backends = backends;
        self
    }

    pub fn backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn crawl_config(mut self, crawl: CrawlConfig) -> Self {
        self.crawl = crawl;
        self
    }

    pub fn training_mode(mut self, enabled: bool) -> Self {
        self.training_mode = enabled;
        self
    }

    pub fn training_files(mut self, proofs: Option<PathBuf>, evidence: Option<PathBuf>) -> Self {
        self.proof_training_file = proofs;
        self.evidence_training_file = evidence;
        self
    }

    pub fn build(self) -> PipelineResult<FactChecker> {
        let patterns = self
            .patterns
            .ok_or(PipelineError::MissingComponent { name: "patterns" })?;
        let models = self
            .models
            .ok_or(PipelineError::MissingComponent { name: "models" })?;
        if self.backends.is_empty() {
            warn!("Fact checker has no search backends; every crawl will be empty");
        }

        let generator = QueryGenerator::new(patterns)
            .with_max_patterns(self.max_patterns.unwrap_or(DEFAULT_MAX_PATTERNS_PER_PREDICATE));
        let cache = self.cache.unwrap_or_else(|| Arc::new(ResultCache::new()));
        let threshold = self
            .proof_score_threshold
            .unwrap_or(DEFAULT_PROOF_SCORE_THRESHOLD);

        Ok(FactChecker {
            generator,
            crawler: EvidenceCrawler::new(self.backends, cache, self.crawl),
            proof_features: ProofFeatureExtractor::new(),
            evidence_features: EvidenceFeatureExtractor::new(threshold),
            proof_scorer: ProofScorer::new(models.proof),
            evidence_scorer: EvidenceScorer::new(models.evidence),
            exporter: TrainingDataExporter::new(),
            training_mode: self.training_mode,
            proof_training_file: self.proof_training_file,
            evidence_training_file: self.evidence_training_file,
            cache_snapshot_path: self.cache_snapshot_path,
        })
    }
}
