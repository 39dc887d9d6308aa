use ferrum_models::common::{
    ChildValue, DiscriminatorType, ExtensionValue, FhirNode, Patient, Primitive, ScalarValue,
    SlicingRules, StructureDefinition, TypeDerivationRule,
};
use serde_json::json;

fn dog_owner_profile() -> serde_json::Value {
    json!({
        "resourceType": "StructureDefinition",
        "url": "http://example.org/fhir/StructureDefinition/dog-owner",
        "name": "DogOwner",
        "type": "Patient",
        "kind": "resource",
        "abstract": false,
        "derivation": "constraint",
        "baseDefinition": "http://hl7.org/fhir/StructureDefinition/Patient",
        "differential": {
            "element": [
                { "path": "Patient" },
                {
                    "path": "Patient.extension",
                    "slicing": {
                        "discriminator": [{ "type": "value", "path": "url" }],
                        "rules": "open"
                    }
                },
                {
                    "path": "Patient.extension",
                    "sliceName": "favouriteDog",
                    "type": [{
                        "code": "Extension",
                        "profile": ["http://example.org/fhir/StructureDefinition/favourite-dog"]
                    }]
                },
                {
                    "path": "Patient.extension.url",
                    "fixedUri": "http://example.org/fhir/StructureDefinition/favourite-dog"
                },
                { "path": "Patient.identifier", "min": 1, "max": "*" }
            ]
        }
    })
}

#[test]
fn parse_profile_differential() {
    let sd = StructureDefinition::from_value(&dog_owner_profile()).unwrap();
    assert_eq!(sd.derivation, Some(TypeDerivationRule::Constraint));

    let elements = sd.differential_elements().unwrap();
    assert_eq!(elements.len(), 5);

    let entry = &elements[1];
    let slicing = entry.slicing.as_ref().expect("slicing should be present");
    assert_eq!(slicing.rules, SlicingRules::Open);
    assert!(slicing.has_discriminators());
    assert_eq!(
        slicing.discriminator.as_ref().unwrap()[0].discriminator_type,
        DiscriminatorType::Value
    );
    assert!(entry.is_extension());

    let member = &elements[2];
    assert_eq!(member.key(), "Patient.extension:favouriteDog");
    assert_eq!(
        member.type_profiles(),
        vec!["http://example.org/fhir/StructureDefinition/favourite-dog"]
    );

    let (suffix, value) = elements[3].fixed_value().expect("fixed url");
    assert_eq!(suffix, "Uri");
    assert_eq!(
        value,
        "http://example.org/fhir/StructureDefinition/favourite-dog"
    );

    assert!(elements[4].is_required());
    assert!(elements[4].is_array());
    assert_eq!(elements[4].cardinality_string(), "1..*");
}

#[test]
fn profile_serializes_back_to_json() {
    let sd = StructureDefinition::from_value(&dog_owner_profile()).unwrap();
    let value = serde_json::to_value(&sd).unwrap();

    assert_eq!(value["abstract"], false);
    assert_eq!(value["differential"]["element"][3]["fixedUri"], sd.url);
}

#[test]
fn typed_patient_exposes_normalized_leaves() {
    let patient = Patient::from_value(&json!({
        "resourceType": "Patient",
        "id": "pat-1",
        "extension": [{
            "url": "http://example.org/fhir/StructureDefinition/favourite-dog",
            "valueString": "Rex"
        }],
        "birthDate": "1974-12",
        "photo": [{ "contentType": "image/png", "data": "aGVsbG8=" }]
    }))
    .unwrap();

    let children = patient.children();
    assert!(matches!(children[0].value, ChildValue::Attribute("pat-1")));

    let extension = children[1].as_node().unwrap();
    assert_eq!(extension.type_name(), "Extension");
    let ext_children = extension.children();
    assert_eq!(ext_children[1].name, "valueString");

    let birth_date = children[2].as_primitive().unwrap();
    assert_eq!(birth_date.type_name(), "date");
    assert!(matches!(birth_date.normalize(), ScalarValue::Date(_)));

    let photo = children[3].as_node().unwrap().children();
    assert_eq!(
        photo[1].as_primitive().map(Primitive::normalize),
        Some(ScalarValue::Binary(b"hello".to_vec()))
    );

    assert!(matches!(
        patient.extension.as_ref().unwrap()[0].value,
        Some(ExtensionValue::String(_))
    ));
}
