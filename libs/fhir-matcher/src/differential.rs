//! Differential tree completion
//!
//! Differentials only list the elements a profile changes, so an element can
//! appear without its parent (`Patient.contact.name` with no
//! `Patient.contact`). Navigation needs every ancestor to be present.

use ferrum_models::ElementDefinition;

/// Insert bare ancestor elements for differential entries whose parent is
/// missing. Existing elements keep their relative order.
pub fn complete_differential(elements: &[ElementDefinition]) -> Vec<ElementDefinition> {
    let mut completed = Vec::with_capacity(elements.len());
    // Paths of the ancestors enclosing the current position, root first
    let mut open: Vec<String> = Vec::new();

    for elem in elements {
        while let Some(top) = open.last() {
            if elem.is_descendant_of(top) {
                break;
            }
            open.pop();
        }

        let segments: Vec<&str> = elem.path.split('.').collect();
        for depth in open.len()..segments.len().saturating_sub(1) {
            let ancestor = segments[..=depth].join(".");
            tracing::trace!(
                path = %ancestor,
                child = %elem.path,
                "inserting missing differential ancestor"
            );
            completed.push(ElementDefinition::new(ancestor.clone()));
            open.push(ancestor);
        }

        completed.push(elem.clone());
        open.push(elem.path.clone());
    }

    completed
}

/// Check that no element is listed before its parent
pub fn is_complete(elements: &[ElementDefinition]) -> bool {
    elements.iter().enumerate().all(|(i, elem)| match elem.parent_path() {
        Some(parent) => elements[..i].iter().any(|e| e.path == parent),
        None => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(elements: &[ElementDefinition]) -> Vec<&str> {
        elements.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn inserts_missing_ancestors() {
        let sparse = vec![
            ElementDefinition::new("Patient.contact.name.family"),
            ElementDefinition::new("Patient.identifier"),
        ];
        assert!(!is_complete(&sparse));

        let completed = complete_differential(&sparse);
        assert_eq!(
            paths(&completed),
            vec![
                "Patient",
                "Patient.contact",
                "Patient.contact.name",
                "Patient.contact.name.family",
                "Patient.identifier"
            ]
        );
        assert!(is_complete(&completed));
    }

    #[test]
    fn complete_differential_is_unchanged() {
        let elements = vec![
            ElementDefinition::new("Patient"),
            ElementDefinition::new("Patient.animal"),
            ElementDefinition {
                slice_name: Some("dog".to_string()),
                ..ElementDefinition::new("Patient.animal")
            },
            ElementDefinition::new("Patient.animal.breed"),
        ];
        assert_eq!(complete_differential(&elements), elements);
    }

    #[test]
    fn slice_children_reuse_the_slice_as_parent() {
        let elements = vec![
            ElementDefinition::new("Patient"),
            ElementDefinition {
                slice_name: Some("dog".to_string()),
                ..ElementDefinition::new("Patient.animal")
            },
            ElementDefinition::new("Patient.animal.breed.coding"),
        ];
        let completed = complete_differential(&elements);
        assert_eq!(
            paths(&completed),
            vec![
                "Patient",
                "Patient.animal",
                "Patient.animal.breed",
                "Patient.animal.breed.coding"
            ]
        );
        assert_eq!(completed[1].slice_name.as_deref(), Some("dog"));
    }
}
