//! The two scoring stages.
//!
//! [`ProofScorer`] applies the proof-level model to each proof's feature
//! vector; [`EvidenceScorer`] applies the fact-level model to the aggregate
//! vector. The fact-level features depend on proof scores, so the stages
//! always run in that order.
//!
//! Models implement [`Classifier`]. [`LogisticModel`] reads a JSON artifact;
//! [`TrainedModels`] loads both at startup and shares them read-only.

pub mod classifier;
pub mod error;
pub mod scorer;


#[cfg(any(test, feature = "mock"))]
pub use classifier::MockClassifier;
pub use classifier::{Classifier, LogisticModel, TrainedModels, sigmoid};
pub use error::{ModelError, ModelResult};
pub use scorer::{EvidenceScorer, ProofScorer};
