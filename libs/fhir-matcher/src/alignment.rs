//! Recursive alignment of a differential with its base
//!
//! Runs the matcher at every level of the differential and collects the
//! decisions into a tree. Merged element definitions are not assembled here.

use crate::bookmark::Bookmark;
use crate::definition_navigator::ElementDefinitionNavigator;
use crate::error::Result;
use crate::issue::MatchIssue;
use crate::matcher::{describe_matches, ElementMatcher, MatchAction, MatchInfo};
use crate::navigator::ElementNavigator;

/// A match together with the alignment of its children
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedElement {
    pub info: MatchInfo,
    /// Key of the base element, if any
    pub base_path: Option<String>,
    /// Key of the differential element, if any
    pub diff_path: Option<String>,
    pub children: Vec<AlignedElement>,
}

/// Number of matches per action across an alignment tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionCounts {
    pub merge: usize,
    pub add: usize,
    pub slice: usize,
}

/// Align the children of `diff`'s current element with `base`, recursively
pub fn align(
    base: &ElementDefinitionNavigator,
    diff: &ElementDefinitionNavigator,
    matcher: &ElementMatcher,
) -> Result<Vec<AlignedElement>> {
    let matches = matcher.match_children(base, diff)?;
    tracing::debug!(
        diff = %diff.path(),
        "aligned level:\n{}",
        describe_matches(&matches, base, diff)
    );

    let mut aligned = Vec::with_capacity(matches.len());
    for info in matches {
        let mut base_nav = base.clone();
        let mut diff_nav = diff.clone();
        let has_base = !info.base_bookmark.is_empty() && base_nav.restore(&info.base_bookmark);
        let has_diff = !info.diff_bookmark.is_empty() && diff_nav.restore(&info.diff_bookmark);

        let children = match (has_base, has_diff) {
            (_, false) => Vec::new(),
            (true, true) => align(&base_nav, &diff_nav, matcher)?,
            (false, true) => added_subtree(&diff_nav),
        };

        aligned.push(AlignedElement {
            base_path: has_base.then(|| element_key(&base_nav)),
            diff_path: has_diff.then(|| element_key(&diff_nav)),
            info,
            children,
        });
    }

    Ok(aligned)
}

/// Children of an element with no base counterpart are all new
fn added_subtree(diff: &ElementDefinitionNavigator) -> Vec<AlignedElement> {
    let mut children = Vec::new();
    let mut cursor = diff.clone();
    if !cursor.enter_children() {
        return children;
    }
    while cursor.move_next(None) {
        children.push(AlignedElement {
            info: MatchInfo::new(MatchAction::Add, Bookmark::empty(), cursor.bookmark()),
            base_path: None,
            diff_path: Some(element_key(&cursor)),
            children: added_subtree(&cursor),
        });
    }
    children
}

fn element_key(nav: &ElementDefinitionNavigator) -> String {
    nav.current().map_or_else(|| nav.path(), |e| e.key())
}

pub fn count_actions(elements: &[AlignedElement]) -> ActionCounts {
    elements.iter().fold(ActionCounts::default(), |mut counts, e| {
        match e.info.action {
            MatchAction::Merge => counts.merge += 1,
            MatchAction::Add => counts.add += 1,
            MatchAction::Slice => counts.slice += 1,
        }
        let nested = count_actions(&e.children);
        counts.merge += nested.merge;
        counts.add += nested.add;
        counts.slice += nested.slice;
        counts
    })
}

/// True when every match in the tree is a Merge
pub fn all_merge(elements: &[AlignedElement]) -> bool {
    elements
        .iter()
        .all(|e| e.info.action == MatchAction::Merge && all_merge(&e.children))
}

/// All issues raised anywhere in the tree, depth first
pub fn issues(elements: &[AlignedElement]) -> Vec<&MatchIssue> {
    let mut found = Vec::new();
    for e in elements {
        if let Some(issue) = &e.info.issue {
            found.push(issue);
        }
        found.extend(issues(&e.children));
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrum_models::ElementDefinition;

    fn nav(paths: &[&str]) -> ElementDefinitionNavigator {
        ElementDefinitionNavigator::new(paths.iter().map(|p| ElementDefinition::new(*p)).collect())
    }

    #[test]
    fn aligns_identical_trees_with_merges() {
        let paths = [
            "Patient",
            "Patient.identifier",
            "Patient.identifier.system",
            "Patient.name",
        ];
        let aligned = align(&nav(&paths), &nav(&paths), &ElementMatcher::default()).unwrap();

        assert_eq!(aligned.len(), 1);
        assert_eq!(aligned[0].diff_path.as_deref(), Some("Patient"));
        assert_eq!(aligned[0].children.len(), 2);
        assert_eq!(aligned[0].children[0].children.len(), 1);
        assert!(all_merge(&aligned));
        assert_eq!(
            count_actions(&aligned),
            ActionCounts {
                merge: 4,
                add: 0,
                slice: 0
            }
        );
    }

    #[test]
    fn unknown_elements_become_added_subtrees() {
        let base = nav(&["Patient", "Patient.name"]);
        let diff = nav(&["Patient", "Patient.animal", "Patient.animal.breed"]);
        let aligned = align(&base, &diff, &ElementMatcher::default()).unwrap();

        let animal = &aligned[0].children[0];
        assert_eq!(animal.info.action, MatchAction::Add);
        assert!(animal.base_path.is_none());
        assert_eq!(animal.children.len(), 1);
        assert_eq!(animal.children[0].diff_path.as_deref(), Some("Patient.animal.breed"));
        assert_eq!(issues(&aligned).len(), 1);
        assert!(!all_merge(&aligned));
    }

    #[test]
    fn leaf_base_adds_all_diff_children() {
        let base = nav(&["Patient", "Patient.animal"]);
        let diff = nav(&["Patient", "Patient.animal", "Patient.animal.species"]);
        let aligned = align(&base, &diff, &ElementMatcher::default()).unwrap();

        let animal = &aligned[0].children[0];
        assert_eq!(animal.info.action, MatchAction::Merge);
        assert_eq!(animal.children[0].info.action, MatchAction::Add);
        assert!(animal.children[0].info.issue.is_none());
    }
}
