mod builder;
pub mod error;
pub mod schema;
pub mod vector;

pub use error::ValidationError;
pub use schema::{FeatureSchema, IRIS};
pub use vector::FeatureVector;
