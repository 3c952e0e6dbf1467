use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or validate a model artifact. Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("artifact was trained on features {found:?}, schema expects {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("{component} has {found} values, expected {expected}")]
    Dimension {
        component: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{0}")]
    Invalid(String),
}

/// Unexpected condition inside scaling or classification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("feature vector has {found} values, model expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("scaled feature {index} is not finite")]
    NonFiniteScaled { index: usize },

    #[error("decision score for class {class:?} is not finite")]
    NonFiniteScore { class: String },
}
