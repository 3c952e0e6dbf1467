//! Standardisation: `z = (x - mean) / scale`, per feature.

use crate::error::{ArtifactError, InferenceError};

/// A fitted standard scaler.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl Scaler {
    /// Build a scaler for `dim` features.
    ///
    /// Every `scale` entry must be finite and non-zero; constant training
    /// columns are stored with scale 1, never 0.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>, dim: usize) -> Result<Self, ArtifactError> {
        check_len("scaler mean", &mean, dim)?;
        check_len("scaler scale", &scale, dim)?;

        if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
            return Err(ArtifactError::Invalid(format!(
                "scaler mean[{i}] is not finite"
            )));
        }
        if let Some(i) = scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(ArtifactError::Invalid(format!(
                "scaler scale[{i}] must be finite and non-zero, got {}",
                scale[i]
            )));
        }

        Ok(Self { mean, scale })
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Transform raw features into the scaled space the classifier expects.
    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if x.len() != self.dim() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.dim(),
                found: x.len(),
            });
        }

        let mut z = Vec::with_capacity(x.len());
        for (index, ((v, m), s)) in x.iter().zip(&self.mean).zip(&self.scale).enumerate() {
            let scaled = (v - m) / s;
            if !scaled.is_finite() {
                return Err(InferenceError::NonFiniteScaled { index });
            }
            z.push(scaled);
        }
        Ok(z)
    }
}

pub(crate) fn check_len(
    component: &'static str,
    values: &[f64],
    expected: usize,
) -> Result<(), ArtifactError> {
    if values.len() != expected {
        return Err(ArtifactError::Dimension {
            component,
            expected,
            found: values.len(),
        });
    }
    Ok(())
}
