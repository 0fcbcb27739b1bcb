use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

use super::error::{ExportError, ExportResult};
use crate::evidence::{Evidence, FeatureVector};

pub const PROOF_RELATION: &str = "factcheck_proofs";
pub const EVIDENCE_RELATION: &str = "factcheck_evidence";

/// One feature vector with its class label (`None` when unknown).
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub features: FeatureVector,
    pub label: Option<bool>,
}

/// Renders rows as an ARFF table.
///
/// Attributes are the union of feature names in name order, followed by the
/// nominal `class {true,false}`; absent features are written as 0 and an
/// unknown label as `?`.
pub fn render_arff(relation: &str, rows: &[TrainingRow]) -> String {
    let attributes: BTreeSet<&str> = rows.iter().flat_map(|r| r.features.names()).collect();

    let mut out = String::new();
    let _ = writeln!(out, "@RELATION {}", relation);
    out.push('\n');
    for name in &attributes {
        let _ = writeln!(out, "@ATTRIBUTE {} NUMERIC", name);
    }
    out.push_str("@ATTRIBUTE class {true,false}\n\n@DATA\n");

    for row in rows {
        let mut values: Vec<String> = attributes
            .iter()
            .map(|name| row.features.get(name).to_string())
            .collect();
        values.push(match row.label {
            Some(true) => "true".to_string(),
            Some(false) => "false".to_string(),
            None => "?".to_string(),
        });
        out.push_str(&values.join(","));
        out.push('\n');
    }
    out
}

fn write_atomically(path: &Path, contents: &str) -> ExportResult<()> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, contents).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)
}

/// Collects training rows across checked facts.
#[derive(Debug, Default)]
pub struct TrainingDataExporter {
    proof_rows: Mutex<Vec<TrainingRow>>,
    evidence_rows: Mutex<Vec<TrainingRow>>,
}

impl TrainingDataExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one row per featured proof and one for the evidence itself.
    pub fn record(&self, evidence: &Evidence) {
        let label = evidence.fact.ground_truth();

        let proofs: Vec<TrainingRow> = evidence
            .proofs
            .iter()
            .filter(|p| !p.features.is_empty())
            .map(|p| TrainingRow {
                features: p.features.clone(),
                label,
            })
            .collect();
        let added = proofs.len();
        self.proof_rows.lock().extend(proofs);

        if !evidence.features.is_empty() {
            self.evidence_rows.lock().push(TrainingRow {
                features: evidence.features.clone(),
                label,
            });
        }

        debug!(fact = %evidence.fact, proof_rows = added, "Recorded training rows");
    }

    pub fn proof_rows(&self) -> usize {
        self.proof_rows.lock().len()
    }

    pub fn evidence_rows(&self) -> usize {
        self.evidence_rows.lock().len()
    }

    /// Rewrites `path` with every proof row recorded so far.
    pub fn write_proof_arff(&self, path: &Path) -> ExportResult<usize> {
        let rows = self.proof_rows.lock().clone();
        write_atomically(path, &render_arff(PROOF_RELATION, &rows))?;
        Ok(rows.len())
    }

    /// Rewrites `path` with every evidence row recorded so far.
    pub fn write_evidence_arff(&self, path: &Path) -> ExportResult<usize> {
        let rows = self.evidence_rows.lock().clone();
        write_atomically(path, &render_arff(EVIDENCE_RELATION, &rows))?;
        Ok(rows.len())
    }
}
