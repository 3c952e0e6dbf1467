/// Ordered feature values, one per schema field.
///
/// Built per request by [`FeatureSchema::build`](crate::FeatureSchema::build)
/// and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Box<[f64]>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values.into_boxed_slice())
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}
