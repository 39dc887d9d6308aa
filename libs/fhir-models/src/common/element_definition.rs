//! FHIR ElementDefinition model
//!
//! Version-agnostic model for ElementDefinition (used in StructureDefinition
//! snapshots and differentials)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Extension element names that are always sliced by url
const EXTENSION_NAMES: [&str; 2] = ["extension", "modifierExtension"];

/// FHIR ElementDefinition - defines an element in a resource or data type structure
///
/// Choice-typed properties (`fixed[x]`, `pattern[x]`, `defaultValue[x]`,
/// `minValue[x]`, `maxValue[x]`) land in [`ElementDefinition::extensions`]
/// under their serialized key (e.g. `fixedUri`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    /// Unique id for inter-element referencing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Path of the element in the hierarchy (e.g., "Patient.name")
    pub path: String,

    /// Codes that define how this element is represented
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representation: Option<Vec<PropertyRepresentation>>,

    /// Name for this particular element (in a slice)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice_name: Option<String>,

    /// If this slice definition constrains an inherited slice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice_is_constraining: Option<bool>,

    /// Short label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    /// Full formal definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    /// Comments about the use of this element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Minimum cardinality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    /// Maximum cardinality (can be "*")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    /// Base definition information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<ElementDefinitionBase>,

    /// Reference to definition of content if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<String>,

    /// Data type and profile for this element
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<ElementDefinitionType>>,

    /// Max length for strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i32>,

    /// Condition that must evaluate to true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Vec<ElementDefinitionConstraint>>,

    /// If this modifies the meaning of other elements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_modifier: Option<bool>,

    /// Include when in summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_summary: Option<bool>,

    /// ValueSet details if this is coded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<ElementDefinitionBinding>,

    /// This element is sliced - slices follow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slicing: Option<ElementDefinitionSlicing>,

    /// If this element must be supported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_support: Option<bool>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// How a property is represented when serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyRepresentation {
    XmlAttr,
    XmlText,
    TypeAttr,
    CdaText,
    Xhtml,
}

/// Base definition information for an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDefinitionBase {
    /// Path that identifies the base element
    pub path: String,

    /// Min cardinality of the base element
    pub min: u32,

    /// Max cardinality of the base element
    pub max: String,
}

/// Data type for an element
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionType {
    /// Data type code
    pub code: String,

    /// Profile (StructureDefinition canonical URLs) that apply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Vec<String>>,

    /// Profile (StructureDefinition) for Reference/canonical target types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_profile: Option<Vec<String>>,
}

impl ElementDefinitionType {
    /// Type reference without profiles
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    /// Type reference constrained to a single profile
    pub fn with_profile(code: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            profile: Some(vec![profile.into()]),
            target_profile: None,
        }
    }
}

/// Constraint on an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDefinitionConstraint {
    /// Target of 'condition' reference
    pub key: String,

    /// Severity (error | warning)
    pub severity: ConstraintSeverity,

    /// Human description of constraint
    pub human: String,

    /// FHIRPath expression of constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

/// Severity of a constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintSeverity {
    Error,
    Warning,
}

/// ValueSet binding for a coded element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionBinding {
    /// Binding strength (required | extensible | preferred | example)
    pub strength: String,

    /// Human explanation of the value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Source of value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,
}

/// Slicing information for an element
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ElementDefinitionSlicing {
    /// Element values that are used to distinguish slices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Vec<ElementDefinitionDiscriminator>>,

    /// Text description of how slicing works
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// If elements must be in same order as slices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordered: Option<bool>,

    /// Slicing rules (closed | open | openAtEnd)
    #[serde(default)]
    pub rules: SlicingRules,
}

impl ElementDefinitionSlicing {
    /// Open slicing with a single discriminator
    pub fn by(discriminator_type: DiscriminatorType, path: impl Into<String>) -> Self {
        Self {
            discriminator: Some(vec![ElementDefinitionDiscriminator {
                discriminator_type,
                path: path.into(),
            }]),
            ..Default::default()
        }
    }

    /// True when at least one discriminator is declared
    pub fn has_discriminators(&self) -> bool {
        self.discriminator.as_ref().is_some_and(|d| !d.is_empty())
    }
}

/// Discriminator for slicing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDefinitionDiscriminator {
    /// Type of discriminator (value | exists | pattern | type | profile)
    #[serde(rename = "type")]
    pub discriminator_type: DiscriminatorType,

    /// Path to element value
    pub path: String,
}

/// Type of slicing discriminator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscriminatorType {
    Value,
    Exists,
    Pattern,
    Type,
    Profile,
}

/// Slicing rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlicingRules {
    Closed,
    #[default]
    Open,
    OpenAtEnd,
}

/// Snapshot - a set of elements that define the structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub element: Vec<ElementDefinition>,
}

/// Differential - a set of elements that define changes from the base
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Differential {
    pub element: Vec<ElementDefinition>,
}

impl ElementDefinition {
    /// Create a bare element definition for a path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Get the key for this element (path:sliceName for slices, just path otherwise)
    pub fn key(&self) -> String {
        if let Some(ref slice_name) = self.slice_name {
            format!("{}:{}", self.path, slice_name)
        } else {
            self.path.clone()
        }
    }

    /// Check if this element has a slice name
    pub fn is_slice(&self) -> bool {
        self.slice_name.is_some()
    }

    /// Get the parent path (everything before the last '.')
    pub fn parent_path(&self) -> Option<String> {
        self.path.rfind('.').map(|pos| self.path[..pos].to_string())
    }

    /// Last segment of the path (e.g. "identifier" for "Patient.identifier")
    pub fn path_name(&self) -> &str {
        self.path
            .rsplit_once('.')
            .map(|(_, name)| name)
            .unwrap_or(&self.path)
    }

    /// Number of segments below the root (the root element has depth 0)
    pub fn depth(&self) -> usize {
        self.path.matches('.').count()
    }

    /// Check if this element is a descendant of the given path
    pub fn is_descendant_of(&self, parent_path: &str) -> bool {
        self.path.starts_with(parent_path)
            && self.path.len() > parent_path.len()
            && self.path.as_bytes().get(parent_path.len()) == Some(&b'.')
    }

    /// Check if this element is a direct child of the given path
    pub fn is_child_of(&self, parent_path: &str) -> bool {
        self.is_descendant_of(parent_path) && !self.path[parent_path.len() + 1..].contains('.')
    }

    /// Check if this is a choice type element (ends with [x])
    pub fn is_choice_type(&self) -> bool {
        self.path.ends_with("[x]")
    }

    /// Check if this element defines an extension (always sliced by url)
    pub fn is_extension(&self) -> bool {
        EXTENSION_NAMES.contains(&self.path_name())
            || self
                .types
                .as_ref()
                .is_some_and(|types| types.iter().any(|t| t.code == "Extension"))
    }

    /// Get all type profiles declared on this element
    pub fn type_profiles(&self) -> Vec<&str> {
        self.types
            .iter()
            .flatten()
            .flat_map(|t| t.profile.iter().flatten())
            .map(String::as_str)
            .collect()
    }

    /// Check if element is required (min > 0)
    pub fn is_required(&self) -> bool {
        self.min.unwrap_or(0) > 0
    }

    /// Check if element is array/list (max = "*" or max > 1)
    pub fn is_array(&self) -> bool {
        self.max
            .as_ref()
            .map(|m| m == "*" || m.parse::<u32>().map(|n| n > 1).unwrap_or(false))
            .unwrap_or(false)
    }

    /// Get the cardinality as a string (e.g., "0..1", "1..*")
    pub fn cardinality_string(&self) -> String {
        let min = self.min.unwrap_or(0);
        let max = self.max.as_deref().unwrap_or("*");
        format!("{}..{}", min, max)
    }

    /// The `fixed[x]` constraint as (type suffix, value), e.g. ("Uri", "http://...")
    pub fn fixed_value(&self) -> Option<(&str, &Value)> {
        self.choice_value("fixed")
    }

    /// The `pattern[x]` constraint as (type suffix, value)
    pub fn pattern_value(&self) -> Option<(&str, &Value)> {
        self.choice_value("pattern")
    }

    fn choice_value(&self, prefix: &str) -> Option<(&str, &Value)> {
        self.extensions.iter().find_map(|(key, value)| {
            let suffix = key.strip_prefix(prefix)?;
            let is_type_suffix = suffix.chars().next().is_some_and(char::is_uppercase);
            (is_type_suffix && !value.is_null()).then_some((suffix, value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_key() {
        let elem = ElementDefinition {
            slice_name: Some("official".to_string()),
            ..ElementDefinition::new("Patient.name")
        };

        assert_eq!(elem.key(), "Patient.name:official");
        assert!(elem.is_slice());
    }

    #[test]
    fn test_is_choice_type() {
        let mut elem = ElementDefinition::new("Observation.value[x]");
        assert!(elem.is_choice_type());

        elem.path = "Observation.value".to_string();
        assert!(!elem.is_choice_type());
    }

    #[test]
    fn test_cardinality_string() {
        let elem = ElementDefinition {
            min: Some(1),
            max: Some("*".to_string()),
            ..ElementDefinition::new("Patient.name")
        };

        assert_eq!(elem.cardinality_string(), "1..*");
        assert!(elem.is_required());
        assert!(elem.is_array());
    }

    #[test]
    fn test_path_helpers() {
        let elem = ElementDefinition::new("Patient.contact.name");

        assert_eq!(elem.path_name(), "name");
        assert_eq!(elem.depth(), 2);
        assert_eq!(elem.parent_path().as_deref(), Some("Patient.contact"));
        assert!(elem.is_child_of("Patient.contact"));
        assert!(!elem.is_child_of("Patient"));
        assert!(elem.is_descendant_of("Patient"));
        assert!(!elem.is_descendant_of("Patient.con"));

        let root = ElementDefinition::new("Patient");
        assert_eq!(root.path_name(), "Patient");
        assert_eq!(root.depth(), 0);
    }

    #[test]
    fn test_is_extension() {
        assert!(ElementDefinition::new("Patient.extension").is_extension());
        assert!(ElementDefinition::new("Patient.modifierExtension").is_extension());

        let typed = ElementDefinition {
            types: Some(vec![ElementDefinitionType::new("Extension")]),
            ..ElementDefinition::new("Patient.animal")
        };
        assert!(typed.is_extension());
        assert!(!ElementDefinition::new("Patient.animal").is_extension());
    }

    #[test]
    fn test_fixed_value_from_json() {
        let elem: ElementDefinition = serde_json::from_value(json!({
            "path": "Extension.extension.url",
            "fixedUri": "age",
            "patternCoding": { "code": "x" }
        }))
        .unwrap();

        let (suffix, value) = elem.fixed_value().unwrap();
        assert_eq!(suffix, "Uri");
        assert_eq!(value, &json!("age"));

        let (suffix, _) = elem.pattern_value().unwrap();
        assert_eq!(suffix, "Coding");
    }

    #[test]
    fn test_slicing_defaults_to_open_rules() {
        let elem: ElementDefinition = serde_json::from_value(json!({
            "path": "Patient.animal",
            "slicing": { "discriminator": [{ "type": "value", "path": "species" }] }
        }))
        .unwrap();

        let slicing = elem.slicing.unwrap();
        assert_eq!(slicing.rules, SlicingRules::Open);
        assert!(slicing.has_discriminators());
    }

    #[test]
    fn test_type_profiles() {
        let elem = ElementDefinition {
            types: Some(vec![ElementDefinitionType::with_profile(
                "Extension",
                "http://example.org/fhir/StructureDefinition/myExtension",
            )]),
            ..ElementDefinition::new("Patient.extension")
        };

        assert_eq!(
            elem.type_profiles(),
            vec!["http://example.org/fhir/StructureDefinition/myExtension"]
        );
    }
}
