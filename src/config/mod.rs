//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `FACTCHECK_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::cache::EmptyResultPolicy;
use crate::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_PATTERNS_PER_PREDICATE,
    DEFAULT_MAX_PLACEHOLDER_TOKENS, DEFAULT_NUMBER_OF_SEARCH_RESULTS,
    DEFAULT_PROOF_SCORE_THRESHOLD, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Default Elasticsearch URL used when `FACTCHECK_ELASTIC_URL` is not set.
pub const DEFAULT_ELASTIC_URL: &str = "http://localhost:9200";
/// Default index path (index/type) holding the article corpus.
pub const DEFAULT_ELASTIC_INDEX: &str = "wikipedia/articles";
/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Search backend selection.
pub enum BackendKind {
    /// Inverted index over a crawled corpus.
    Elastic,
    /// General web-search API.
    Web,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "elastic" | "elasticsearch" => Ok(Self::Elastic),
            "web" | "bing" => Ok(Self::Web),
            _ => Err(format!("unknown search backend: {}", s)),
        }
    }
}

/// Pipeline configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `FACTCHECK_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for models, patterns and exports. Default: `./data`.
    pub data_dir: PathBuf,

    /// JSON pattern inventory. Default: `<data_dir>/patterns.json`.
    pub patterns_path: PathBuf,

    /// Proof-level model artifact. Default: `<data_dir>/models/proof.json`.
    pub proof_model_path: PathBuf,

    /// Fact-level model artifact. Default: `<data_dir>/models/evidence.json`.
    pub evidence_model_path: PathBuf,

    /// Backends queried for every worklist entry, in order. Default: `[Elastic]`.
    pub backends: Vec<BackendKind>,

    /// Elasticsearch endpoint. Default: `http://localhost:9200`.
    pub elastic_url: String,

    /// Index path below `elastic_url`. Default: `wikipedia/articles`.
    pub elastic_index: String,

    /// Web search endpoint (required when [`BackendKind::Web`] is enabled).
    pub web_search_url: Option<String>,

    /// Web search subscription key (required when [`BackendKind::Web`] is enabled).
    pub web_search_key: Option<String>,

    /// Documents materialized per backend call. Default: `50`.
    pub number_of_search_results: usize,

    /// Patterns considered per predicate and language. Default: `50`.
    pub max_patterns_per_predicate: usize,

    /// In-flight worklist entries per crawl. Default: `8`.
    pub max_concurrency: usize,

    /// Timeout applied to each backend call. Default: 10s.
    pub request_timeout: Duration,

    /// Longest token span a placeholder may match. Default: `5`.
    pub max_placeholder_tokens: usize,

    /// Max entries in the result cache. Default: `10_000`.
    pub cache_capacity: u64,

    /// Optional JSON snapshot the cache is loaded from and saved to.
    pub cache_snapshot_path: Option<PathBuf>,

    /// Whether zero-document backend results are cached. Default: cache.
    pub empty_result_policy: EmptyResultPolicy,

    /// Proof score counted as "confident" by the evidence features. Default: `0.5`.
    pub proof_score_threshold: f64,

    /// Skip the final evidence scoring stage. Default: `false`.
    pub training_mode: bool,

    /// Proof-level ARFF export target (export disabled when unset).
    pub proof_training_file: Option<PathBuf>,

    /// Fact-level ARFF export target (export disabled when unset).
    pub evidence_training_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_data_dir(PathBuf::from(DEFAULT_DATA_DIR))
    }
}

impl Config {
    const ENV_DATA_DIR: &'static str = "FACTCHECK_DATA_DIR";
    const ENV_PATTERNS_PATH: &'static str = "FACTCHECK_PATTERNS_PATH";
    const ENV_PROOF_MODEL_PATH: &'static str = "FACTCHECK_PROOF_MODEL_PATH";
    const ENV_EVIDENCE_MODEL_PATH: &'static str = "FACTCHECK_EVIDENCE_MODEL_PATH";
    const ENV_BACKENDS: &'static str = "FACTCHECK_BACKENDS";
    const ENV_ELASTIC_URL: &'static str = "FACTCHECK_ELASTIC_URL";
    const ENV_ELASTIC_INDEX: &'static str = "FACTCHECK_ELASTIC_INDEX";
    const ENV_WEB_SEARCH_URL: &'static str = "FACTCHECK_WEB_SEARCH_URL";
    const ENV_WEB_SEARCH_KEY: &'static str = "FACTCHECK_WEB_SEARCH_KEY";
    const ENV_NUMBER_OF_SEARCH_RESULTS: &'static str = "FACTCHECK_NUMBER_OF_SEARCH_RESULTS";
    const ENV_MAX_PATTERNS: &'static str = "FACTCHECK_MAX_PATTERNS";
    const ENV_MAX_CONCURRENCY: &'static str = "FACTCHECK_MAX_CONCURRENCY";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "FACTCHECK_REQUEST_TIMEOUT_SECS";
    const ENV_MAX_PLACEHOLDER_TOKENS: &'static str = "FACTCHECK_MAX_PLACEHOLDER_TOKENS";
    const ENV_CACHE_CAPACITY: &'static str = "FACTCHECK_CACHE_CAPACITY";
    const ENV_CACHE_SNAPSHOT_PATH: &'static str = "FACTCHECK_CACHE_SNAPSHOT_PATH";
    const ENV_CACHE_EMPTY_RESULTS: &'static str = "FACTCHECK_CACHE_EMPTY_RESULTS";
    const ENV_PROOF_THRESHOLD: &'static str = "FACTCHECK_PROOF_THRESHOLD";
    const ENV_TRAINING_MODE: &'static str = "FACTCHECK_TRAINING_MODE";
    const ENV_PROOF_TRAINING_FILE: &'static str = "FACTCHECK_PROOF_TRAINING_FILE";
    const ENV_EVIDENCE_TRAINING_FILE: &'static str = "FACTCHECK_EVIDENCE_TRAINING_FILE";

    /// Defaults with every data file resolved below `data_dir`.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            patterns_path: data_dir.join("patterns.json"),
            proof_model_path: data_dir.join("models").join("proof.json"),
            evidence_model_path: data_dir.join("models").join("evidence.json"),
            data_dir,
            backends: vec![BackendKind::Elastic],
            elastic_url: DEFAULT_ELASTIC_URL.to_string(),
            elastic_index: DEFAULT_ELASTIC_INDEX.to_string(),
            web_search_url: None,
            web_search_key: None,
            number_of_search_results: DEFAULT_NUMBER_OF_SEARCH_RESULTS,
            max_patterns_per_predicate: DEFAULT_MAX_PATTERNS_PER_PREDICATE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_placeholder_tokens: DEFAULT_MAX_PLACEHOLDER_TOKENS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_snapshot_path: None,
            empty_result_policy: EmptyResultPolicy::default(),
            proof_score_threshold: DEFAULT_PROOF_SCORE_THRESHOLD,
            training_mode: false,
            proof_training_file: None,
            evidence_training_file: None,
        }
    }

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir =
            Self::parse_path_from_env(Self::ENV_DATA_DIR, PathBuf::from(DEFAULT_DATA_DIR));
        let defaults = Self::with_data_dir(data_dir);

        let patterns_path =
            Self::parse_path_from_env(Self::ENV_PATTERNS_PATH, defaults.patterns_path);
        let proof_model_path =
            Self::parse_path_from_env(Self::ENV_PROOF_MODEL_PATH, defaults.proof_model_path);
        let evidence_model_path =
            Self::parse_path_from_env(Self::ENV_EVIDENCE_MODEL_PATH, defaults.evidence_model_path);
        let backends = Self::parse_backends_from_env(defaults.backends)?;
        let elastic_url = Self::parse_string_from_env(Self::ENV_ELASTIC_URL, defaults.elastic_url);
        let elastic_index =
            Self::parse_string_from_env(Self::ENV_ELASTIC_INDEX, defaults.elastic_index);
        let web_search_url = Self::parse_optional_string_from_env(Self::ENV_WEB_SEARCH_URL);
        let web_search_key = Self::parse_optional_string_from_env(Self::ENV_WEB_SEARCH_KEY);
        let number_of_search_results = Self::parse_from_env(
            Self::ENV_NUMBER_OF_SEARCH_RESULTS,
            defaults.number_of_search_results,
        )?;
        let max_patterns_per_predicate =
            Self::parse_from_env(Self::ENV_MAX_PATTERNS, defaults.max_patterns_per_predicate)?;
        let max_concurrency =
            Self::parse_from_env(Self::ENV_MAX_CONCURRENCY, defaults.max_concurrency)?;
        let request_timeout = Self::parse_from_env(
            Self::ENV_REQUEST_TIMEOUT_SECS,
            defaults.request_timeout.as_secs(),
        )
        .map(Duration::from_secs)?;
        let max_placeholder_tokens = Self::parse_from_env(
            Self::ENV_MAX_PLACEHOLDER_TOKENS,
            defaults.max_placeholder_tokens,
        )?;
        let cache_capacity =
            Self::parse_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity)?;
        let cache_snapshot_path = Self::parse_optional_path_from_env(Self::ENV_CACHE_SNAPSHOT_PATH);
        let empty_result_policy =
            Self::parse_from_env(Self::ENV_CACHE_EMPTY_RESULTS, defaults.empty_result_policy)?;
        let proof_score_threshold =
            Self::parse_from_env(Self::ENV_PROOF_THRESHOLD, defaults.proof_score_threshold)?;
        let training_mode =
            Self::parse_bool_from_env(Self::ENV_TRAINING_MODE, defaults.training_mode);
        let proof_training_file = Self::parse_optional_path_from_env(Self::ENV_PROOF_TRAINING_FILE);
        let evidence_training_file =
            Self::parse_optional_path_from_env(Self::ENV_EVIDENCE_TRAINING_FILE);

        Ok(Self {
            data_dir: defaults.data_dir,
            patterns_path,
            proof_model_path,
            evidence_model_path,
            backends,
            elastic_url,
            elastic_index,
            web_search_url,
            web_search_key,
            number_of_search_results,
            max_patterns_per_predicate,
            max_concurrency,
            request_timeout,
            max_placeholder_tokens,
            cache_capacity,
            cache_snapshot_path,
            empty_result_policy,
            proof_score_threshold,
            training_mode,
            proof_training_file,
            evidence_training_file,
        })
    }

    /// Validates numeric bounds, backend requirements and path shapes.
    ///
    /// Does not require model or pattern files to exist; loading them reports
    /// their own errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.exists() && !self.data_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.data_dir.clone(),
            });
        }

        for path in [
            &self.patterns_path,
            &self.proof_model_path,
            &self.evidence_model_path,
        ] {
            Self::validate_file_if_present(path)?;
        }

        if self.number_of_search_results == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_NUMBER_OF_SEARCH_RESULTS,
            });
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_MAX_CONCURRENCY,
            });
        }
        if self.max_placeholder_tokens == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_MAX_PLACEHOLDER_TOKENS,
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_REQUEST_TIMEOUT_SECS,
            });
        }
        if !(0.0..=1.0).contains(&self.proof_score_threshold) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_PROOF_THRESHOLD,
                value: self.proof_score_threshold,
            });
        }

        if self.backends.contains(&BackendKind::Web) {
            if self.web_search_url.is_none() {
                return Err(ConfigError::MissingEnvVar {
                    name: Self::ENV_WEB_SEARCH_URL,
                });
            }
            if self.web_search_key.is_none() {
                return Err(ConfigError::MissingEnvVar {
                    name: Self::ENV_WEB_SEARCH_KEY,
                });
            }
        }

        Ok(())
    }

    fn validate_file_if_present(path: &Path) -> Result<(), ConfigError> {
        if path.exists() && !path.is_file() {
            return Err(ConfigError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn parse_backends_from_env(default: Vec<BackendKind>) -> Result<Vec<BackendKind>, ConfigError> {
        let Ok(value) = env::var(Self::ENV_BACKENDS) else {
            return Ok(default);
        };

        let mut backends = Vec::new();
        for part in value.split(',').filter(|p| !p.trim().is_empty()) {
            let kind = part.parse().map_err(|reason| ConfigError::InvalidValue {
                name: Self::ENV_BACKENDS,
                value: value.clone(),
                reason,
            })?;
            if !backends.contains(&kind) {
                backends.push(kind);
            }
        }

        if backends.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_BACKENDS,
                value,
                reason: "no backend selected".to_string(),
            });
        }

        Ok(backends)
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: var_name,
                    value: value.clone(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        env::var(var_name)
            .map(|s| {
                let s = s.trim().to_lowercase();
                s == "true" || s == "1" || s == "yes"
            })
            .unwrap_or(default)
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }
}
