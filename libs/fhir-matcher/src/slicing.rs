//! Slice group analysis
//!
//! Siblings sharing a name form a slice group. A sliced group starts with a
//! slice entry carrying the slicing declaration, followed by named slice
//! members. Extensions are sliced by url implicitly: an extension element
//! that declares a profile or fixes its `url` is a member even without a
//! slice name.

use crate::bookmark::Bookmark;
use crate::definition_navigator::ElementDefinitionNavigator;
use crate::navigator::ElementNavigator;
use crate::settings::MatcherSettings;
use ferrum_models::{ElementDefinition, ElementDefinitionSlicing, SlicingRules};

/// One child element together with its position
#[derive(Debug, Clone, Copy)]
pub struct SliceSlot<'e> {
    pub bookmark: Bookmark,
    pub element: &'e ElementDefinition,
}

/// Contiguous run of same-named siblings
#[derive(Debug, Clone)]
pub struct SliceGroup<'e> {
    pub name: &'e str,
    pub slots: Vec<SliceSlot<'e>>,
}

/// How a slice member is identified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceIdentity<'e> {
    Name(&'e str),
    /// Extension identified by its type profile
    Profile(&'e str),
    /// Extension identified by the fixed value of its `url` child
    Url(String),
}

impl<'e> SliceGroup<'e> {
    pub fn first(&self) -> Option<&SliceSlot<'e>> {
        self.slots.first()
    }

    pub fn is_extension(&self) -> bool {
        self.slots.iter().any(|s| s.element.is_extension())
    }

    /// The group declares slicing, or has named members
    pub fn is_sliced(&self) -> bool {
        self.slots
            .iter()
            .any(|s| s.element.slicing.is_some() || s.element.slice_name.is_some())
    }
}

/// Children of the navigator's current node, grouped by name
pub fn child_groups(nav: &ElementDefinitionNavigator) -> Vec<SliceGroup<'_>> {
    let mut groups: Vec<SliceGroup<'_>> = Vec::new();
    let mut cursor = nav.clone();
    if !cursor.enter_children() {
        return groups;
    }

    while cursor.move_next(None) {
        let Some(index) = cursor.ordinal_position() else {
            continue;
        };
        let element = &nav.elements()[index];
        let slot = SliceSlot {
            bookmark: cursor.bookmark(),
            element,
        };
        let name = element.path_name();
        match groups.last_mut() {
            Some(group) if group.name == name => group.slots.push(slot),
            _ => groups.push(SliceGroup {
                name,
                slots: vec![slot],
            }),
        }
    }

    groups
}

/// Fixed url of an extension element's `url` child, if constrained
pub fn fixed_extension_url(
    nav: &ElementDefinitionNavigator,
    slot: &SliceSlot<'_>,
) -> Option<String> {
    let mut cursor = nav.clone();
    if !cursor.restore(&slot.bookmark) || !cursor.move_to_child("url") {
        return None;
    }
    cursor.value().and_then(|v| v.as_str().map(str::to_string))
}

/// Url-based identity of an extension element (profile first, then fixed url)
pub fn extension_identity<'e>(
    nav: &ElementDefinitionNavigator,
    slot: &SliceSlot<'e>,
) -> Option<SliceIdentity<'e>> {
    if !slot.element.is_extension() {
        return None;
    }
    if let Some(profile) = slot.element.type_profiles().first() {
        return Some(SliceIdentity::Profile(*profile));
    }
    fixed_extension_url(nav, slot).map(SliceIdentity::Url)
}

/// All identities a member can be matched by, most specific first
pub fn member_identities<'e>(
    nav: &ElementDefinitionNavigator,
    slot: &SliceSlot<'e>,
    settings: &MatcherSettings,
) -> Vec<SliceIdentity<'e>> {
    let mut identities = Vec::new();
    if let Some(name) = slot.element.slice_name.as_deref() {
        identities.push(SliceIdentity::Name(name));
    }
    if settings.implicit_extension_slicing && slot.element.is_extension() {
        if let Some(profile) = slot.element.type_profiles().first() {
            identities.push(SliceIdentity::Profile(*profile));
        }
        if let Some(url) = fixed_extension_url(nav, slot) {
            identities.push(SliceIdentity::Url(url));
        }
    }
    identities
}

/// An unnamed element that is not an extension identified by url opens the
/// group as its slice entry
pub fn is_slice_entry(
    nav: &ElementDefinitionNavigator,
    slot: &SliceSlot<'_>,
    settings: &MatcherSettings,
) -> bool {
    if slot.element.slice_name.is_some() {
        return false;
    }
    !(settings.implicit_extension_slicing && extension_identity(nav, slot).is_some())
}

/// Parent slice of a reslice name (`dog` for `dog/schnauzer`)
pub fn reslice_parent(slice_name: &str, separator: char) -> Option<&str> {
    slice_name.rsplit_once(separator).map(|(parent, _)| parent)
}

/// Slicing declaration resulting from a differential applied on top of its
/// base
pub fn merge_slicing(
    base: Option<&ElementDefinitionSlicing>,
    diff: &ElementDefinitionSlicing,
) -> ElementDefinitionSlicing {
    let Some(base) = base else {
        return diff.clone();
    };
    ElementDefinitionSlicing {
        discriminator: diff
            .discriminator
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| base.discriminator.clone()),
        description: diff
            .description
            .clone()
            .or_else(|| base.description.clone()),
        ordered: diff.ordered.or(base.ordered),
        rules: match (&base.rules, &diff.rules) {
            // the most restrictive rule wins
            (_, SlicingRules::Closed) | (SlicingRules::Closed, _) => SlicingRules::Closed,
            (_, SlicingRules::OpenAtEnd) | (SlicingRules::OpenAtEnd, _) => SlicingRules::OpenAtEnd,
            (_, diff_rules) => diff_rules.clone(),
        },
    }
}

/// True when neither the base nor the differential declares a discriminator
pub fn discriminators_missing(
    base: Option<&ElementDefinition>,
    diff: &ElementDefinition,
) -> bool {
    let Some(diff_slicing) = diff.slicing.as_ref() else {
        return false;
    };
    let base_slicing = base.and_then(|b| b.slicing.as_ref());
    !merge_slicing(base_slicing, diff_slicing).has_discriminators()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrum_models::{DiscriminatorType, ElementDefinitionType};
    use serde_json::json;

    fn sliced(path: &str) -> ElementDefinition {
        ElementDefinition {
            slicing: Some(ElementDefinitionSlicing::by(DiscriminatorType::Value, "url")),
            ..ElementDefinition::new(path)
        }
    }

    fn named(path: &str, name: &str) -> ElementDefinition {
        ElementDefinition {
            slice_name: Some(name.to_string()),
            ..ElementDefinition::new(path)
        }
    }

    fn profiled_extension(path: &str, profile: &str) -> ElementDefinition {
        ElementDefinition {
            types: Some(vec![ElementDefinitionType::with_profile("Extension", profile)]),
            ..ElementDefinition::new(path)
        }
    }

    fn at_patient(elements: Vec<ElementDefinition>) -> ElementDefinitionNavigator {
        let mut nav = ElementDefinitionNavigator::new(elements);
        nav.move_to_first_child(None);
        nav
    }

    #[test]
    fn groups_contiguous_names() {
        let nav = at_patient(vec![
            ElementDefinition::new("Patient"),
            sliced("Patient.animal"),
            named("Patient.animal", "dog"),
            named("Patient.animal", "cat"),
            ElementDefinition::new("Patient.active"),
        ]);

        let groups = child_groups(&nav);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "animal");
        assert_eq!(groups[0].slots.len(), 3);
        assert!(groups[0].is_sliced());
        assert!(!groups[1].is_sliced());
        assert!(!groups[0].is_extension());
    }

    #[test]
    fn profiled_extension_is_a_member_not_an_entry() {
        let settings = MatcherSettings::default();
        let nav = at_patient(vec![
            ElementDefinition::new("Patient"),
            ElementDefinition::new("Patient.extension"),
            profiled_extension("Patient.extension", "http://example.org/ext"),
        ]);

        let groups = child_groups(&nav);
        let slots = &groups[0].slots;
        assert!(is_slice_entry(&nav, &slots[0], &settings));
        assert!(!is_slice_entry(&nav, &slots[1], &settings));
        assert_eq!(
            member_identities(&nav, &slots[1], &settings),
            vec![SliceIdentity::Profile("http://example.org/ext")]
        );

        let without_implicit = MatcherSettings {
            implicit_extension_slicing: false,
            ..Default::default()
        };
        assert!(is_slice_entry(&nav, &slots[1], &without_implicit));
    }

    #[test]
    fn extension_identified_by_fixed_url() {
        let settings = MatcherSettings::default();
        let mut url = ElementDefinition::new("Patient.extension.url");
        url.extensions
            .insert("fixedUri".to_string(), json!("http://example.org/owner"));
        let nav = at_patient(vec![
            ElementDefinition::new("Patient"),
            named("Patient.extension", "owner"),
            url,
        ]);

        let groups = child_groups(&nav);
        let slot = &groups[0].slots[0];
        assert_eq!(
            member_identities(&nav, slot, &settings),
            vec![
                SliceIdentity::Name("owner"),
                SliceIdentity::Url("http://example.org/owner".to_string())
            ]
        );
    }

    #[test]
    fn reslice_parent_splits_on_separator() {
        assert_eq!(reslice_parent("dog/schnauzer", '/'), Some("dog"));
        assert_eq!(reslice_parent("dog/schnauzer/mini", '/'), Some("dog/schnauzer"));
        assert_eq!(reslice_parent("dog", '/'), None);
    }

    #[test]
    fn merges_slicing_definitions() {
        let base = ElementDefinitionSlicing {
            discriminator: Some(vec![ferrum_models::ElementDefinitionDiscriminator {
                discriminator_type: DiscriminatorType::Value,
                path: "code".to_string(),
            }]),
            ordered: Some(false),
            ..Default::default()
        };
        let diff = ElementDefinitionSlicing {
            description: Some("Updated description".to_string()),
            ordered: Some(true),
            rules: SlicingRules::OpenAtEnd,
            ..Default::default()
        };

        let merged = merge_slicing(Some(&base), &diff);
        assert!(merged.has_discriminators());
        assert_eq!(merged.description.as_deref(), Some("Updated description"));
        assert_eq!(merged.ordered, Some(true));
        assert_eq!(merged.rules, SlicingRules::OpenAtEnd);
    }

    #[test]
    fn closed_rules_win() {
        let base = ElementDefinitionSlicing {
            rules: SlicingRules::Closed,
            ..Default::default()
        };
        let merged = merge_slicing(Some(&base), &ElementDefinitionSlicing::default());
        assert_eq!(merged.rules, SlicingRules::Closed);
    }

    #[test]
    fn detects_missing_discriminators() {
        let diff = ElementDefinition {
            slicing: Some(ElementDefinitionSlicing::default()),
            ..ElementDefinition::new("Patient.animal")
        };
        assert!(discriminators_missing(None, &diff));
        assert!(!discriminators_missing(Some(&sliced("Patient.animal")), &diff));
        assert!(!discriminators_missing(None, &ElementDefinition::new("Patient.animal")));
    }
}
