//! Scale-then-classify over a shared, read-only artifact.

use std::sync::Arc;

use irisgate_core::FeatureVector;

use crate::artifact::ModelArtifact;
use crate::error::InferenceError;

/// Runs predictions against one loaded [`ModelArtifact`].
///
/// Cloning is cheap and every clone reads the same artifact. No locking is
/// needed: the artifact is immutable after load.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    artifact: Arc<ModelArtifact>,
}

impl InferenceEngine {
    pub fn new(artifact: Arc<ModelArtifact>) -> Self {
        Self { artifact }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Predict one label from the artifact's class set.
    ///
    /// Same input, same label, for the lifetime of the artifact.
    pub fn predict(&self, vector: &FeatureVector) -> Result<&str, InferenceError> {
        let expected = self.artifact.schema().len();
        if vector.len() != expected {
            return Err(InferenceError::DimensionMismatch {
                expected,
                found: vector.len(),
            });
        }

        let scaled = self.artifact.scaler().transform(vector.as_slice())?;
        self.artifact.classifier().classify(&scaled)
    }
}
