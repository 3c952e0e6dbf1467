//! The fixed set of labels a classifier can emit.

use std::collections::HashSet;

use crate::error::ArtifactError;

/// Class labels in classifier output order.
///
/// Index `i` is the label for row `i` of the classifier's weights or
/// centroids. At least two labels, no duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSet {
    labels: Vec<String>,
}

impl ClassSet {
    pub fn new(labels: Vec<String>) -> Result<Self, ArtifactError> {
        if labels.len() < 2 {
            return Err(ArtifactError::Invalid(format!(
                "classifier needs at least 2 classes, got {}",
                labels.len()
            )));
        }

        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if label.is_empty() {
                return Err(ArtifactError::Invalid("empty class label".into()));
            }
            if !seen.insert(label.as_str()) {
                return Err(ArtifactError::Invalid(format!(
                    "duplicate class label {label:?}"
                )));
            }
        }

        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at `index`. Panics if out of range; callers index by row.
    pub fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
