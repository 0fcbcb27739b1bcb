//! The fact-checking pipeline.
//!
//! [`FactChecker`] wires the stages together for one fact at a time:
//! query generation, evidence crawling, proof features, proof scoring,
//! evidence features and finally evidence scoring. [`CheckMode::CrawlOnly`]
//! stops after the crawl; training mode stops before the final score so the
//! feature vectors can be exported as labelled rows.
//!
//! A check never fails once the checker is built. Missing labels, failing
//! backends and empty crawls all surface through [`crate::evidence::Verdict`].

pub mod checker;
pub mod error;

#[cfg(test)]
mod tests;

pub use checker::{CheckMode, FactChecker, FactCheckerBuilder};
pub use error::{PipelineError, PipelineResult};
