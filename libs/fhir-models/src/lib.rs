//! FHIR data models
//!
//! This crate provides strongly-typed Rust structures for FHIR conformance
//! resources and a small typed instance graph.
//!
//! # Module Organization
//!
//! - `common`: Version-agnostic models that work across FHIR R4, R4B, and R5
//!   - `element_definition` / `structure_definition`: snapshot and differential element lists
//!   - `primitive` / `temporal`: primitive leaf values and partial date/time types
//!   - `node`: the [`FhirNode`] trait for walking typed instances generically
//!   - `datatypes` / `patient`: typed models implementing [`FhirNode`]
//!
//! # Design Philosophy
//!
//! - **Version-agnostic core**: Common fields present across all FHIR versions
//! - **Extensible**: `extensions` field captures choice-typed or custom properties
//! - **Strongly-typed**: Type safety for common operations
//!
//! # Example
//!
//! ```rust
//! use ferrum_models::common::{StructureDefinition, StructureDefinitionKind};
//! use serde_json::json;
//!
//! let sd_json = json!({
//!     "resourceType": "StructureDefinition",
//!     "id": "Patient",
//!     "url": "http://hl7.org/fhir/StructureDefinition/Patient",
//!     "name": "Patient",
//!     "kind": "resource",
//!     "abstract": false,
//!     "type": "Patient",
//!     "differential": {
//!         "element": [{ "path": "Patient" }, { "path": "Patient.identifier", "min": 1 }]
//!     }
//! });
//!
//! let sd = StructureDefinition::from_value(&sd_json).unwrap();
//! assert_eq!(sd.name, "Patient");
//! assert_eq!(sd.kind, StructureDefinitionKind::Resource);
//! assert!(sd.differential_elements().unwrap()[1].is_required());
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
