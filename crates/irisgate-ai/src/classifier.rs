//! Deterministic decision functions over scaled feature vectors.
//!
//! Two model families are supported:
//!
//! - **Linear**: one weight row and intercept per class, label is the argmax
//!   of `W·z + b` (logistic regression, linear SVM). A single row over two
//!   classes is the binary form: a positive score picks the second class.
//! - **Nearest centroid**: one centroid per class, label is the class whose
//!   centroid is closest in squared Euclidean distance.
//!
//! Ties always resolve to the lowest class index, so the output is a pure
//! function of the input.

use crate::error::{ArtifactError, InferenceError};
use crate::labels::ClassSet;
use crate::scaler::check_len;

/// A fitted classifier with a fixed class set.
///
/// Only built through [`Classifier::linear`] or
/// [`Classifier::nearest_centroid`], which validate every dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    classes: ClassSet,
    dim: usize,
    model: Model,
}

#[derive(Debug, Clone, PartialEq)]
enum Model {
    Linear {
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    NearestCentroid {
        centroids: Vec<Vec<f64>>,
    },
}

impl Classifier {
    /// Build a linear classifier over `dim` scaled features.
    pub fn linear(
        classes: ClassSet,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
        dim: usize,
    ) -> Result<Self, ArtifactError> {
        let rows = if classes.len() == 2 && coef.len() == 1 {
            1
        } else {
            classes.len()
        };
        if coef.len() != rows {
            return Err(ArtifactError::Dimension {
                component: "classifier coef rows",
                expected: rows,
                found: coef.len(),
            });
        }
        check_len("classifier intercept", &intercept, rows)?;
        for row in &coef {
            check_len("classifier coef row", row, dim)?;
        }
        check_finite("classifier coef", coef.iter().flatten())?;
        check_finite("classifier intercept", intercept.iter())?;

        Ok(Self {
            classes,
            dim,
            model: Model::Linear { coef, intercept },
        })
    }

    /// Build a nearest-centroid classifier over `dim` scaled features.
    pub fn nearest_centroid(
        classes: ClassSet,
        centroids: Vec<Vec<f64>>,
        dim: usize,
    ) -> Result<Self, ArtifactError> {
        if centroids.len() != classes.len() {
            return Err(ArtifactError::Dimension {
                component: "classifier centroids",
                expected: classes.len(),
                found: centroids.len(),
            });
        }
        for centroid in &centroids {
            check_len("classifier centroid", centroid, dim)?;
        }
        check_finite("classifier centroids", centroids.iter().flatten())?;

        Ok(Self {
            classes,
            dim,
            model: Model::NearestCentroid { centroids },
        })
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }

    /// Number of scaled features each input must have.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Short name of the model family, for logs.
    pub fn kind(&self) -> &'static str {
        match self.model {
            Model::Linear { .. } => "linear",
            Model::NearestCentroid { .. } => "nearest_centroid",
        }
    }

    /// Pick one label for a scaled feature vector.
    pub fn classify(&self, z: &[f64]) -> Result<&str, InferenceError> {
        if z.len() != self.dim {
            return Err(InferenceError::DimensionMismatch {
                expected: self.dim,
                found: z.len(),
            });
        }

        let index = match &self.model {
            Model::Linear { coef, intercept } => {
                let scores = linear_scores(coef, intercept, z);
                check_scores(&self.classes, &scores)?;
                if scores.len() == 1 {
                    usize::from(scores[0] > 0.0)
                } else {
                    best_match(&scores, |candidate, best| candidate > best)
                }
            }
            Model::NearestCentroid { centroids } => {
                let distances: Vec<f64> = centroids.iter().map(|c| squared_distance(c, z)).collect();
                check_scores(&self.classes, &distances)?;
                best_match(&distances, |candidate, best| candidate < best)
            }
        };
        Ok(self.classes.label(index))
    }
}

// ── Decision helpers ──

fn linear_scores(coef: &[Vec<f64>], intercept: &[f64], z: &[f64]) -> Vec<f64> {
    coef.iter()
        .zip(intercept)
        .map(|(row, b)| dot(row, z) + b)
        .collect()
}

/// Index of the best score under `better`. The first of equal scores wins.
fn best_match(scores: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best_index = 0;
    let mut best = scores[0];
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if better(score, best) {
            best = score;
            best_index = i;
        }
    }
    best_index
}

fn check_scores(classes: &ClassSet, scores: &[f64]) -> Result<(), InferenceError> {
    match scores.iter().position(|s| !s.is_finite()) {
        None => Ok(()),
        Some(i) => {
            // A binary linear model has one score, owned by the positive class.
            let index = if scores.len() == 1 { 1 } else { i };
            Err(InferenceError::NonFiniteScore {
                class: classes.label(index).to_string(),
            })
        }
    }
}

fn check_finite<'a>(
    component: &str,
    mut values: impl Iterator<Item = &'a f64>,
) -> Result<(), ArtifactError> {
    if values.any(|v| !v.is_finite()) {
        return Err(ArtifactError::Invalid(format!(
            "{component} contains a non-finite value"
        )));
    }
    Ok(())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
