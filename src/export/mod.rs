//! Training-data export.
//!
//! Accumulates proof-level and fact-level feature vectors with the fact's
//! ground-truth label and writes them as ARFF tables for offline retraining.
//! This is a side channel: export failures never change a fact's evidence.

pub mod arff;
pub mod error;


pub use arff::{TrainingDataExporter, TrainingRow, render_arff};
pub use error::{ExportError, ExportResult};
