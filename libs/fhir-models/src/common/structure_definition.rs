//! FHIR StructureDefinition model
//!
//! Only the parts needed to walk snapshot and differential element lists.

use super::element_definition::{Differential, ElementDefinition, Snapshot};
use super::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

fn default_resource_type() -> String {
    "StructureDefinition".to_string()
}

/// FHIR StructureDefinition resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinition {
    /// Resource type - always "StructureDefinition"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical identifier
    #[serde(default)]
    pub url: String,

    /// Name (computer friendly)
    #[serde(default)]
    pub name: String,

    /// Type defined or constrained by this structure
    #[serde(rename = "type", default)]
    pub type_: String,

    /// primitive-type | complex-type | resource | logical
    #[serde(default)]
    pub kind: StructureDefinitionKind,

    /// Whether the structure is abstract
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,

    /// Definition that this type is constrained/specialized from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_definition: Option<String>,

    /// specialization | constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<TypeDerivationRule>,

    /// Snapshot view of the structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,

    /// Differential view of the structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub differential: Option<Differential>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Kind of structure being defined
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureDefinitionKind {
    PrimitiveType,
    ComplexType,
    #[default]
    Resource,
    Logical,
}

/// How a type relates to its base definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeDerivationRule {
    Specialization,
    Constraint,
}

impl StructureDefinition {
    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        let sd: Self = serde_json::from_value(value.clone())?;
        if sd.resource_type != "StructureDefinition" {
            return Err(Error::InvalidResource(format!(
                "expected StructureDefinition, got {}",
                sd.resource_type
            )));
        }
        Ok(sd)
    }

    /// Profile with only a differential, as authored by users
    pub fn with_differential(elements: Vec<ElementDefinition>) -> Self {
        Self {
            resource_type: default_resource_type(),
            differential: Some(Differential { element: elements }),
            ..Default::default()
        }
    }

    /// Snapshot elements, or an error when the snapshot is missing
    pub fn snapshot_elements(&self) -> Result<&[ElementDefinition]> {
        self.snapshot
            .as_ref()
            .map(|s| s.element.as_slice())
            .ok_or_else(|| Error::MissingField(format!("{}: snapshot", self.url)))
    }

    /// Differential elements, or an error when the differential is missing
    pub fn differential_elements(&self) -> Result<&[ElementDefinition]> {
        self.differential
            .as_ref()
            .map(|d| d.element.as_slice())
            .ok_or_else(|| Error::MissingField(format!("{}: differential", self.url)))
    }
}
