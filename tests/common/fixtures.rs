use std::path::{Path, PathBuf};
use std::sync::Arc;

use factcheck::fact::{Fact, Pattern, PatternStore};
use factcheck::search::Document;

pub const BIRTH_PLACE: &str = "dbo:birthPlace";

pub fn einstein() -> Fact {
    Fact::new("dbr:Albert_Einstein", BIRTH_PLACE, "dbr:Ulm")
        .with_name("einstein_birthplace")
        .with_labels("en", "Einstein", "Ulm")
        .with_ground_truth(true)
}

pub fn english_patterns() -> Arc<PatternStore> {
    Arc::new(PatternStore::from_patterns([Pattern::new(
        "en",
        BIRTH_PLACE,
        "?D? was born in ?R?",
        0.9,
    )]))
}

pub fn page(url: &str, text: &str, rank: f64) -> Document {
    Document::new(url, "Albert Einstein", text, rank, "en")
}

/// Writes a data directory laid out the way `Config::with_data_dir` expects.
pub fn write_data_dir(root: &Path) -> PathBuf {
    std::fs::create_dir_all(root.join("models")).unwrap();
    std::fs::write(
        root.join("patterns.json"),
        r#"[
            {"language": "en", "predicate": "dbo:birthPlace", "template": "?D? was born in ?R?", "naturalness": 0.9},
            {"language": "en", "predicate": "dbo:birthPlace", "template": "?R? is the birthplace of ?D?", "naturalness": 0.4}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        root.join("models").join("proof.json"),
        r#"{"name": "proof", "bias": -2.0, "weights": {"subject_similarity": 2.0, "object_similarity": 2.0}}"#,
    )
    .unwrap();
    std::fs::write(
        root.join("models").join("evidence.json"),
        r#"{"name": "evidence", "bias": -1.0, "weights": {"max_proof_score": 4.0}}"#,
    )
    .unwrap();
    root.to_path_buf()
}
