//! Version-agnostic FHIR models
//!
//! Types that work across FHIR R4, R4B, and R5

pub mod datatypes;
pub mod element_definition;
pub mod error;
pub mod node;
pub mod patient;
pub mod primitive;
pub mod structure_definition;
pub mod temporal;

// Re-export commonly used types
pub use datatypes::*;
pub use element_definition::*;
pub use error::{Error, Result};
pub use node::{ChildList, ChildValue, FhirNode, NamedChild};
pub use patient::*;
pub use primitive::{Primitive, ScalarValue};
pub use structure_definition::*;
pub use temporal::*;
