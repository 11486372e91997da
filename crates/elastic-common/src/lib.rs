//! Common types for the elastic training operator: CRDs, errors, events and labels

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod events;
pub mod labels;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// API group of the ElasticJob custom resource
pub const ELASTIC_GROUP: &str = "elastic.pytorch.org";

/// Annotation stamped on a pod template once rendezvous arguments were injected
pub const CONFIGURED_ANNOTATION: &str = "elastic.pytorch.org/rdzv-configured";
