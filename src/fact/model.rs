use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Surface labels of subject and object in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub subject: String,
    pub object: String,
}

impl Labels {
    pub fn new(subject: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            object: object.into(),
        }
    }
}

/// A subject-predicate-object assertion to verify.
///
/// Built once by the fact loader and never mutated afterwards; the `with_*`
/// methods consume and return the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    #[serde(default)]
    name: Option<String>,
    subject_uri: String,
    predicate_uri: String,
    object_uri: String,
    #[serde(default)]
    labels: BTreeMap<String, Labels>,
    #[serde(default)]
    languages: BTreeSet<String>,
    #[serde(default)]
    ground_truth: Option<bool>,
}

impl Fact {
    pub fn new(
        subject_uri: impl Into<String>,
        predicate_uri: impl Into<String>,
        object_uri: impl Into<String>,
    ) -> Self {
        Self {
            name: None,
            subject_uri: subject_uri.into(),
            predicate_uri: predicate_uri.into(),
            object_uri: object_uri.into(),
            labels: BTreeMap::new(),
            languages: BTreeSet::new(),
            ground_truth: None,
        }
    }

    /// Adds labels for `language` and declares the language.
    pub fn with_labels(
        mut self,
        language: impl Into<String>,
        subject: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        let language = language.into();
        self.languages.insert(language.clone());
        self.labels.insert(language, Labels::new(subject, object));
        self
    }

    /// Declares a language without labels.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.languages.insert(language.into());
        self
    }

    pub fn with_ground_truth(mut self, is_true: bool) -> Self {
        self.ground_truth = Some(is_true);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn subject_uri(&self) -> &str {
        &self.subject_uri
    }

    pub fn predicate_uri(&self) -> &str {
        &self.predicate_uri
    }

    pub fn object_uri(&self) -> &str {
        &self.object_uri
    }

    pub fn labels(&self, language: &str) -> Option<&Labels> {
        self.labels.get(language)
    }

    pub fn subject_label(&self, language: &str) -> Option<&str> {
        self.labels.get(language).map(|l| l.subject.as_str())
    }

    pub fn object_label(&self, language: &str) -> Option<&str> {
        self.labels.get(language).map(|l| l.object.as_str())
    }

    /// Declared languages, in a stable order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(String::as_str)
    }

    pub fn language_count(&self) -> usize {
        self.languages.len()
    }

    pub fn declares_language(&self, language: &str) -> bool {
        self.languages.contains(language)
    }

    pub fn ground_truth(&self) -> Option<bool> {
        self.ground_truth
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(
                f,
                "<{}> <{}> <{}>",
                self.subject_uri, self.predicate_uri, self.object_uri
            ),
        }
    }
}
