//! Datapoint type identifiers.

pub mod identifier;

pub use identifier::{normalize, DptId, TypeIdentifier};
