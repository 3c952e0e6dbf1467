//! Model artifact: the immutable (scaler, classifier) pair served for the
//! process lifetime.
//!
//! The on-disk form is a single JSON document:
//!
//! ```json
//! {
//!   "feature_names": ["sepal length (cm)", "..."],
//!   "scaler": { "mean": [..], "scale": [..] },
//!   "classifier": { "kind": "linear", "classes": [..], "coef": [[..]], "intercept": [..] }
//! }
//! ```
//!
//! `feature_names` is optional; when present it must list the schema's fields
//! in the schema's order, which catches artifacts trained on reordered columns.

use std::path::Path;

use irisgate_core::FeatureSchema;
use serde::Deserialize;
use tracing::info;

use crate::classifier::Classifier;
use crate::error::ArtifactError;
use crate::labels::ClassSet;
use crate::scaler::Scaler;

/// Loaded, validated (scaler, classifier) pair.
///
/// Never mutated after construction; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    schema: FeatureSchema,
    scaler: Scaler,
    classifier: Classifier,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ArtifactDocument {
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    scaler: ScalerDocument,
    classifier: ClassifierDocument,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ScalerDocument {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
enum ClassifierDocument {
    Linear {
        classes: Vec<String>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    NearestCentroid {
        classes: Vec<String>,
        centroids: Vec<Vec<f64>>,
    },
}

impl ModelArtifact {
    /// Pair an already-built scaler and classifier for `schema`.
    pub fn new(
        schema: FeatureSchema,
        scaler: Scaler,
        classifier: Classifier,
    ) -> Result<Self, ArtifactError> {
        if scaler.dim() != schema.len() {
            return Err(ArtifactError::Dimension {
                component: "scaler",
                expected: schema.len(),
                found: scaler.dim(),
            });
        }
        if classifier.dim() != schema.len() {
            return Err(ArtifactError::Dimension {
                component: "classifier",
                expected: schema.len(),
                found: classifier.dim(),
            });
        }
        Ok(Self {
            schema,
            scaler,
            classifier,
        })
    }

    /// Read and validate an artifact file.
    pub fn load(path: &Path, schema: FeatureSchema) -> Result<Self, ArtifactError> {
        let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact = Self::from_slice(&bytes, schema)?;

        info!(
            path = %path.display(),
            kind = artifact.classifier.kind(),
            classes = artifact.classes().len(),
            features = schema.len(),
            "loaded model artifact"
        );
        Ok(artifact)
    }

    /// Parse and validate an artifact from JSON bytes.
    pub fn from_slice(bytes: &[u8], schema: FeatureSchema) -> Result<Self, ArtifactError> {
        let doc: ArtifactDocument = serde_json::from_slice(bytes)?;
        let dim = schema.len();

        if let Some(names) = doc.feature_names
            && !schema.matches(names.as_slice())
        {
            return Err(ArtifactError::FeatureMismatch {
                expected: schema.names().iter().map(|s| s.to_string()).collect(),
                found: names,
            });
        }

        let scaler = Scaler::new(doc.scaler.mean, doc.scaler.scale, dim)?;
        let classifier = match doc.classifier {
            ClassifierDocument::Linear {
                classes,
                coef,
                intercept,
            } => Classifier::linear(ClassSet::new(classes)?, coef, intercept, dim)?,
            ClassifierDocument::NearestCentroid { classes, centroids } => {
                Classifier::nearest_centroid(ClassSet::new(classes)?, centroids, dim)?
            }
        };

        Self::new(schema, scaler, classifier)
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// The fixed set of labels this artifact can predict.
    pub fn classes(&self) -> &ClassSet {
        self.classifier.classes()
    }
}
