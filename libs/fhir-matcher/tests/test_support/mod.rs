#![allow(dead_code)]

use ferrum_matcher::{
    Bookmark, ElementDefinitionNavigator, ElementNavigator, MatchAction, MatchInfo,
};
use ferrum_models::{
    DiscriminatorType, ElementDefinition, ElementDefinitionSlicing, ElementDefinitionType,
    Snapshot, StructureDefinition,
};
use serde_json::json;

pub const MY_EXTENSION: &str = "http://example.org/fhir/StructureDefinition/myExtension";
pub const MY_OTHER_EXTENSION: &str = "http://example.org/fhir/StructureDefinition/myOtherExtension";

pub fn element(path: &str) -> ElementDefinition {
    ElementDefinition::new(path)
}

pub fn repeating(path: &str) -> ElementDefinition {
    ElementDefinition {
        max: Some("*".to_string()),
        ..element(path)
    }
}

pub fn typed(path: &str, code: &str) -> ElementDefinition {
    ElementDefinition {
        types: Some(vec![ElementDefinitionType::new(code)]),
        ..element(path)
    }
}

/// Slice entry discriminated by value at `discriminator`
pub fn sliced(path: &str, discriminator: &str) -> ElementDefinition {
    ElementDefinition {
        slicing: Some(ElementDefinitionSlicing::by(DiscriminatorType::Value, discriminator)),
        ..element(path)
    }
}

pub fn slice(path: &str, name: &str) -> ElementDefinition {
    ElementDefinition {
        slice_name: Some(name.to_string()),
        ..element(path)
    }
}

/// Named slice that reslices itself
pub fn resliced(path: &str, name: &str, discriminator: &str) -> ElementDefinition {
    ElementDefinition {
        slice_name: Some(name.to_string()),
        ..sliced(path, discriminator)
    }
}

pub fn extension_entry(path: &str) -> ElementDefinition {
    ElementDefinition {
        slicing: Some(ElementDefinitionSlicing::by(DiscriminatorType::Value, "url")),
        ..typed(path, "Extension")
    }
}

pub fn profiled_extension(path: &str, profile: &str) -> ElementDefinition {
    ElementDefinition {
        types: Some(vec![ElementDefinitionType::with_profile("Extension", profile)]),
        ..element(path)
    }
}

pub fn fixed_uri(path: &str, uri: &str) -> ElementDefinition {
    let mut elem = element(path);
    elem.extensions.insert("fixedUri".to_string(), json!(uri));
    elem
}

pub fn with_min(mut elem: ElementDefinition, min: u32) -> ElementDefinition {
    elem.min = Some(min);
    elem
}

/// Trimmed core Patient snapshot
pub fn patient_snapshot() -> StructureDefinition {
    let elements = vec![
        element("Patient"),
        typed("Patient.id", "id"),
        typed("Patient.meta", "Meta"),
        ElementDefinition {
            max: Some("*".to_string()),
            ..typed("Patient.extension", "Extension")
        },
        repeating("Patient.identifier"),
        typed("Patient.identifier.system", "uri"),
        typed("Patient.identifier.value", "string"),
        typed("Patient.active", "boolean"),
        repeating("Patient.name"),
        typed("Patient.birthDate", "date"),
        element("Patient.animal"),
        typed("Patient.animal.species", "CodeableConcept"),
        typed("Patient.animal.breed", "CodeableConcept"),
        repeating("Patient.contact"),
        typed("Patient.contact.name", "HumanName"),
    ];
    StructureDefinition {
        url: "http://hl7.org/fhir/StructureDefinition/Patient".to_string(),
        name: "Patient".to_string(),
        type_: "Patient".to_string(),
        snapshot: Some(Snapshot { element: elements }),
        ..StructureDefinition::with_differential(Vec::new())
    }
}

/// Trimmed core Extension snapshot
pub fn extension_snapshot() -> StructureDefinition {
    let elements = vec![
        element("Extension"),
        typed("Extension.id", "id"),
        ElementDefinition {
            max: Some("*".to_string()),
            ..typed("Extension.extension", "Extension")
        },
        typed("Extension.url", "uri"),
        element("Extension.value[x]"),
    ];
    StructureDefinition {
        url: "http://hl7.org/fhir/StructureDefinition/Extension".to_string(),
        name: "Extension".to_string(),
        type_: "Extension".to_string(),
        snapshot: Some(Snapshot { element: elements }),
        ..StructureDefinition::with_differential(Vec::new())
    }
}

pub fn snapshot_nav(sd: &StructureDefinition) -> ElementDefinitionNavigator {
    ElementDefinitionNavigator::for_snapshot(sd).unwrap_or_else(|e| panic!("no snapshot: {}", e))
}

pub fn differential_nav(elements: Vec<ElementDefinition>) -> ElementDefinitionNavigator {
    let sd = StructureDefinition::with_differential(elements);
    ElementDefinitionNavigator::for_differential(&sd)
        .unwrap_or_else(|e| panic!("no differential: {}", e))
}

/// Move to the first child, panicking if there is none
pub fn first_child(nav: &mut ElementDefinitionNavigator) {
    assert!(nav.move_to_first_child(None), "{} has no children", nav.path());
}

pub fn child(nav: &mut ElementDefinitionNavigator, name: &str) {
    assert!(nav.move_to_child(name), "{} has no child {}", nav.path(), name);
}

pub fn next(nav: &mut ElementDefinitionNavigator) {
    assert!(nav.move_next(None), "{} has no next sibling", nav.path());
}

/// Assert a single match of `action` between the navigators' positions
pub fn assert_single(
    matches: &[MatchInfo],
    action: MatchAction,
    base: &ElementDefinitionNavigator,
    diff: &ElementDefinitionNavigator,
) {
    assert_eq!(matches.len(), 1, "expected one match, got {:?}", matches);
    assert_match(&matches[0], action, base.bookmark(), diff.bookmark());
}

pub fn assert_match(info: &MatchInfo, action: MatchAction, base: Bookmark, diff: Bookmark) {
    assert_eq!(info.action, action, "unexpected action in {:?}", info);
    assert_eq!(info.base_bookmark, base, "unexpected base in {:?}", info);
    assert_eq!(info.diff_bookmark, diff, "unexpected diff in {:?}", info);
}
