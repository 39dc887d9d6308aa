//! FHIR Patient resource
//!
//! Trimmed to the elements commonly constrained by profiles.

use super::datatypes::{Attachment, Extension, HumanName, Identifier, Meta, Narrative};
use super::error::{Error, Result};
use super::node::{ChildList, FhirNode, NamedChild};
use super::primitive::Primitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_resource_type() -> String {
    "Patient".to_string()
}

/// Demographics and administrative information about a person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Resource type - always "Patient"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// Text summary of the resource, for human interpretation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Narrative>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// An identifier for this patient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    /// Whether this patient's record is in active use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// A name associated with the patient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<HumanName>>,

    /// male | female | other | unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    /// The date of birth for the individual
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    /// Whether patient is part of a multiple birth, as an ordinal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_birth_integer: Option<i32>,

    /// Image of the patient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<Attachment>>,

    /// A contact party (e.g. guardian, partner, friend) for the patient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<PatientContact>>,
}

/// A contact party for the patient (backbone element)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// A name associated with the contact person
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<HumanName>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl Default for Patient {
    fn default() -> Self {
        Self {
            resource_type: default_resource_type(),
            id: None,
            meta: None,
            text: None,
            extension: None,
            identifier: None,
            active: None,
            name: None,
            gender: None,
            birth_date: None,
            multiple_birth_integer: None,
            photo: None,
            contact: None,
        }
    }
}

impl Patient {
    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        let patient: Self = serde_json::from_value(value.clone())?;
        if patient.resource_type != "Patient" {
            return Err(Error::InvalidResource(format!(
                "expected Patient, got {}",
                patient.resource_type
            )));
        }
        Ok(patient)
    }
}

impl FhirNode for Patient {
    fn type_name(&self) -> &str {
        "Patient"
    }

    fn children(&self) -> Vec<NamedChild<'_>> {
        ChildList::new()
            .attribute("id", self.id.as_deref())
            .node("meta", self.meta.as_ref())
            .node("text", self.text.as_ref())
            .nodes("extension", self.extension.as_deref())
            .nodes("identifier", self.identifier.as_deref())
            .primitive("active", self.active.map(Primitive::Boolean))
            .nodes("name", self.name.as_deref())
            .text("gender", "code", self.gender.as_deref())
            .primitive("birthDate", self.birth_date.clone().map(Primitive::Date))
            .primitive(
                "multipleBirthInteger",
                self.multiple_birth_integer.map(Primitive::Integer),
            )
            .nodes("photo", self.photo.as_deref())
            .nodes("contact", self.contact.as_deref())
            .build()
    }
}

impl FhirNode for PatientContact {
    fn type_name(&self) -> &str {
        "BackboneElement"
    }

    fn children(&self) -> Vec<NamedChild<'_>> {
        ChildList::new()
            .attribute("id", self.id.as_deref())
            .node("name", self.name.as_ref())
            .text("gender", "code", self.gender.as_deref())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn children_follow_element_order() {
        let patient = Patient::from_value(&json!({
            "resourceType": "Patient",
            "id": "example",
            "identifier": [{ "system": "urn:oid:1.2.36.146.595.217.0.1", "value": "12345" }],
            "active": true,
            "name": [{ "family": "Chalmers" }, { "family": "Windsor" }],
            "birthDate": "1974-12-25",
            "contact": [{ "gender": "female" }]
        }))
        .unwrap();

        let names: Vec<_> = patient.children().iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec!["id", "identifier", "active", "name", "name", "birthDate", "contact"]
        );
    }

    #[test]
    fn contact_is_a_backbone_element() {
        let contact = PatientContact::default();
        assert_eq!(contact.type_name(), "BackboneElement");
        assert!(contact.children().is_empty());
    }

    #[test]
    fn rejects_other_resource_types() {
        let result = Patient::from_value(&json!({ "resourceType": "Observation" }));
        assert!(matches!(result, Err(Error::InvalidResource(_))));
    }
}
