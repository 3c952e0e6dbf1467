//! The fixed, ordered feature schema a model was trained on.
//!
//! Position in the schema is position in the feature vector. Payload key order
//! never decides where a value lands.

/// Feature names of the iris measurements, in training column order.
pub const IRIS_FEATURES: &[&str] = &[
    "sepal length (cm)",
    "sepal width (cm)",
    "petal length (cm)",
    "petal width (cm)",
];

/// The schema served by default.
pub const IRIS: FeatureSchema = FeatureSchema::new(IRIS_FEATURES);

/// Ordered sequence of named numeric fields, fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    fields: &'static [&'static str],
}

impl FeatureSchema {
    /// Wrap a static field list. Names must be unique.
    pub const fn new(fields: &'static [&'static str]) -> Self {
        Self { fields }
    }

    /// Field names in vector order.
    pub fn names(&self) -> &'static [&'static str] {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Vector position of `name`, if it belongs to the schema.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| *f == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// True if `names` lists exactly this schema's fields in the same order.
    pub fn matches<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.len() == self.fields.len()
            && names
                .iter()
                .zip(self.fields)
                .all(|(n, f)| n.as_ref() == *f)
    }
}
