use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::error::{ModelError, ModelResult};
use crate::config::Config;
use crate::evidence::FeatureVector;

/// A pretrained model mapping a feature vector to a probability.
///
/// Models are loaded once and shared read-only between facts.
pub trait Classifier: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Probability in `[0, 1]`.
    fn predict(&self, features: &FeatureVector) -> f64;
}

/// Logistic regression over named features.
///
/// Artifact format: `{"name": "...", "bias": f64, "weights": {"feature": f64}}`.
/// Features the vector lacks contribute 0; vector features without a weight
/// are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogisticModel {
    name: String,
    #[serde(default)]
    bias: f64,
    #[serde(default)]
    weights: BTreeMap<String, f64>,
}

impl LogisticModel {
    pub fn new(name: impl Into<String>, bias: f64, weights: BTreeMap<String, f64>) -> Self {
        Self {
            name: name.into(),
            bias,
            weights,
        }
    }

    pub fn load(path: &Path) -> ModelResult<Self> {
        if !path.exists() {
            return Err(ModelError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model: LogisticModel =
            serde_json::from_slice(&bytes).map_err(|source| ModelError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(reason) = model.invalid_reason() {
            return Err(ModelError::Invalid {
                path: path.to_path_buf(),
                reason,
            });
        }

        info!(
            model = %model.name,
            weights = model.weights.len(),
            path = %path.display(),
            "Loaded logistic model"
        );
        Ok(model)
    }

    fn invalid_reason(&self) -> Option<String> {
        if !self.bias.is_finite() {
            return Some(format!("bias must be finite, got {}", self.bias));
        }
        self.weights
            .iter()
            .find(|(_, w)| !w.is_finite())
            .map(|(name, w)| format!("weight for '{}' must be finite, got {}", name, w))
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    fn logit(&self, features: &FeatureVector) -> f64 {
        self.weights
            .iter()
            .map(|(name, weight)| weight * features.get(name))
            .sum::<f64>()
            + self.bias
    }
}

impl Classifier for LogisticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &FeatureVector) -> f64 {
        sigmoid(self.logit(features))
    }
}

#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// The proof-level and fact-level models.
#[derive(Debug, Clone)]
pub struct TrainedModels {
    pub proof: Arc<dyn Classifier>,
    pub evidence: Arc<dyn Classifier>,
}

impl TrainedModels {
    pub fn new(proof: Arc<dyn Classifier>, evidence: Arc<dyn Classifier>) -> Self {
        Self { proof, evidence }
    }

    /// Loads both artifacts named by `config`. A missing model is fatal.
    pub fn load(config: &Config) -> ModelResult<Self> {
        let proof = LogisticModel::load(&config.proof_model_path)?;
        let evidence = LogisticModel::load(&config.evidence_model_path)?;
        Ok(Self::new(Arc::new(proof), Arc::new(evidence)))
    }
}

#[cfg(any(test, feature = "mock"))]
pub use mock::MockClassifier;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use super::Classifier;
    use crate::evidence::FeatureVector;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    enum Output {
        Constant(f64),
        Feature(String),
    }

    /// Deterministic classifier for tests.
    #[derive(Debug)]
    pub struct MockClassifier {
        name: String,
        output: Output,
        calls: AtomicUsize,
    }

    impl MockClassifier {
        /// Always predicts `value`.
        pub fn constant(value: f64) -> Self {
            Self {
                name: format!("constant-{}", value),
                output: Output::Constant(value),
                calls: AtomicUsize::new(0),
            }
        }

        /// Predicts the value of one feature, clamped to `[0, 1]`.
        pub fn feature(name: &str) -> Self {
            Self {
                name: format!("feature-{}", name),
                output: Output::Feature(name.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Classifier for MockClassifier {
        fn name(&self) -> &str {
            &self.name
        }

        fn predict(&self, features: &FeatureVector) -> f64 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.output {
                Output::Constant(v) => *v,
                Output::Feature(name) => features.get(name).clamp(0.0, 1.0),
            }
        }
    }
}
