//! Per-fact results: proofs, feature vectors, the evidence bundle and its verdict.

pub mod features;
pub mod proof;
pub mod types;


pub use features::FeatureVector;
pub use proof::ComplexProof;
pub use types::{CrawlStats, Evidence, Verdict};
