//! Inference layer: loads the (scaler, classifier) artifact once and runs the
//! deterministic scale-then-classify pipeline over feature vectors.

mod artifact;
mod classifier;
mod engine;
mod error;
mod labels;
mod scaler;

pub use artifact::ModelArtifact;
pub use classifier::Classifier;
pub use engine::InferenceEngine;
pub use error::{ArtifactError, InferenceError};
pub use labels::ClassSet;
pub use scaler::Scaler;

#[cfg(test)]
mod testing;
