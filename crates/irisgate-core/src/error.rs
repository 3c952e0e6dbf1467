use thiserror::Error;

/// A payload that cannot be turned into a feature vector.
///
/// Each variant lists every offending key, so one round trip is enough for a
/// client to fix its request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid JSON body: {0}")]
    MalformedJson(String),

    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("unknown feature(s): {}", .0.join(", "))]
    UnknownFeatures(Vec<String>),

    #[error("missing feature(s): {}", .0.join(", "))]
    MissingFeatures(Vec<String>),

    #[error("non-numeric value for feature(s): {}", .0.join(", "))]
    NonNumeric(Vec<String>),
}
