//! Payload validation: raw JSON in, schema-ordered [`FeatureVector`] out.
//!
//! Checks run in a fixed order so the same bad payload always yields the same
//! error: unknown keys first, then missing fields, then non-numeric values.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::schema::FeatureSchema;
use crate::vector::FeatureVector;

impl FeatureSchema {
    /// Build a feature vector from a name → value mapping.
    ///
    /// Unknown keys are rejected rather than ignored, so a client sending
    /// features for a different schema fails loudly.
    pub fn build(&self, payload: &Map<String, Value>) -> Result<FeatureVector, ValidationError> {
        let mut unknown: Vec<String> = payload
            .keys()
            .filter(|k| !self.contains(k))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(ValidationError::UnknownFeatures(unknown));
        }

        let missing: Vec<String> = self
            .names()
            .iter()
            .filter(|name| !payload.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFeatures(missing));
        }

        let mut values = Vec::with_capacity(self.len());
        let mut non_numeric = Vec::new();
        for name in self.names() {
            // Presence was checked above.
            match payload.get(*name).and_then(Value::as_f64) {
                Some(v) => values.push(v),
                None => non_numeric.push(name.to_string()),
            }
        }
        if !non_numeric.is_empty() {
            return Err(ValidationError::NonNumeric(non_numeric));
        }

        Ok(FeatureVector::from(values))
    }

    /// Build from any JSON value; anything but an object is rejected.
    pub fn build_value(&self, value: &Value) -> Result<FeatureVector, ValidationError> {
        match value {
            Value::Object(map) => self.build(map),
            _ => Err(ValidationError::NotAnObject),
        }
    }

    /// Parse a request body and build from it.
    pub fn build_slice(&self, body: &[u8]) -> Result<FeatureVector, ValidationError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::MalformedJson(e.to_string()))?;
        self.build_value(&value)
    }
}
