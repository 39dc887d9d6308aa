//! Differential-to-base element matching
//!
//! [`ElementMatcher::match_children`] aligns the children of a differential
//! element with the children of the corresponding base element. Siblings are
//! processed one slice group (run of same-named siblings) at a time:
//!
//! - plain groups pair up positionally and merge;
//! - a differential slice entry slices the base group;
//! - a slice member merges into the base member it identifies (by slice
//!   name, or for extensions by profile or fixed url), or is added as a new
//!   slice when the base has no such member.
//!
//! The result lists one [`MatchInfo`] per differential element, plus implied
//! slice entries, in the order a snapshot generator must apply them.

use crate::bookmark::Bookmark;
use crate::definition_navigator::ElementDefinitionNavigator;
use crate::error::{Error, Result};
use crate::issue::{IssueCode, MatchIssue};
use crate::navigator::ElementNavigator;
use crate::settings::MatcherSettings;
use crate::slicing::{
    child_groups, discriminators_missing, extension_identity, is_slice_entry, member_identities,
    reslice_parent, SliceGroup, SliceIdentity, SliceSlot,
};
use std::collections::HashSet;
use std::fmt;

/// How a differential element combines with the base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchAction {
    /// Constrain the referenced base element
    Merge,
    /// Insert a new element, using the base element (if any) as template
    Add,
    /// Open or constrain slicing on the referenced base element
    Slice,
}

impl fmt::Display for MatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge => f.pad("Merge"),
            Self::Add => f.pad("Add"),
            Self::Slice => f.pad("Slice"),
        }
    }
}

/// One alignment decision
#[derive(Debug, Clone, PartialEq)]
pub struct MatchInfo {
    pub action: MatchAction,
    /// Base element, or empty when there is none
    pub base_bookmark: Bookmark,
    /// Differential element, or empty for implied slice entries
    pub diff_bookmark: Bookmark,
    pub issue: Option<MatchIssue>,
}

impl MatchInfo {
    pub fn new(action: MatchAction, base_bookmark: Bookmark, diff_bookmark: Bookmark) -> Self {
        Self {
            action,
            base_bookmark,
            diff_bookmark,
            issue: None,
        }
    }

    pub fn with_issue(mut self, issue: MatchIssue) -> Self {
        self.issue = Some(issue);
        self
    }
}

/// Aligns differential siblings with base siblings
#[derive(Debug, Clone, Default)]
pub struct ElementMatcher {
    settings: MatcherSettings,
}

/// Per-call state shared by the group matchers
struct LevelState<'n> {
    base: &'n ElementDefinitionNavigator,
    diff: &'n ElementDefinitionNavigator,
    claimed: HashSet<Bookmark>,
    matches: Vec<MatchInfo>,
}

impl LevelState<'_> {
    fn push(&mut self, info: MatchInfo) {
        if let Some(issue) = &info.issue {
            tracing::warn!(
                code = %issue.code,
                location = issue.location.as_deref().unwrap_or_default(),
                "{}",
                issue.diagnostics
            );
        }
        self.matches.push(info);
    }
}

impl ElementMatcher {
    pub fn new(settings: MatcherSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MatcherSettings {
        &self.settings
    }

    /// Match the children of `diff`'s current element against the children
    /// of `base`'s current element.
    ///
    /// Both navigators must be positioned on corresponding elements, or both
    /// be unpositioned (the virtual root whose children are the root
    /// elements). The navigators are not moved.
    pub fn match_children(
        &self,
        base: &ElementDefinitionNavigator,
        diff: &ElementDefinitionNavigator,
    ) -> Result<Vec<MatchInfo>> {
        self.check_positions(base, diff)?;

        let diff_groups = child_groups(diff);
        if diff_groups.is_empty() {
            return Ok(Vec::new());
        }
        let base_groups = child_groups(base);

        let mut state = LevelState {
            base,
            diff,
            claimed: HashSet::new(),
            matches: Vec::with_capacity(diff_groups.len()),
        };

        for diff_group in &diff_groups {
            let start = state.matches.len();

            if base_groups.is_empty() {
                for slot in &diff_group.slots {
                    state.push(MatchInfo::new(
                        MatchAction::Add,
                        Bookmark::empty(),
                        slot.bookmark,
                    ));
                }
            } else if let Some(base_group) = self.find_base_group(&base_groups, diff_group.name) {
                if self.is_plain(diff, diff_group, base_group) {
                    self.match_plain(&mut state, diff_group, base_group);
                } else {
                    self.match_sliced(&mut state, diff_group, base_group);
                }
            } else {
                for slot in &diff_group.slots {
                    let issue = MatchIssue::error(
                        IssueCode::NotFound,
                        format!(
                            "Element '{}' does not exist in the base at '{}'",
                            slot.element.key(),
                            base.path()
                        ),
                    )
                    .with_location(slot.element.key());
                    state.push(
                        MatchInfo::new(MatchAction::Add, Bookmark::empty(), slot.bookmark)
                            .with_issue(issue),
                    );
                }
            }

            tracing::debug!(
                base = %base.path(),
                diff = %diff.path(),
                group = diff_group.name,
                matches = state.matches.len() - start,
                "matched slice group"
            );
        }

        Ok(state.matches)
    }

    fn check_positions(
        &self,
        base: &ElementDefinitionNavigator,
        diff: &ElementDefinitionNavigator,
    ) -> Result<()> {
        match (base.is_at_root(), diff.is_at_root()) {
            (true, true) => Ok(()),
            (false, false) => match (base.name(), diff.name()) {
                (Some(b), Some(d)) if b == d || self.is_choice_rename(b, d) => Ok(()),
                (Some(_), Some(_)) => Err(Error::Structure(format!(
                    "base is positioned at '{}' but differential at '{}'",
                    base.path(),
                    diff.path()
                ))),
                _ => Err(Error::Structure(
                    "navigator is not positioned on an element".to_string(),
                )),
            },
            (true, false) => Err(Error::Structure(format!(
                "base is at the root but differential is positioned at '{}'",
                diff.path()
            ))),
            (false, true) => Err(Error::Structure(format!(
                "differential is at the root but base is positioned at '{}'",
                base.path()
            ))),
        }
    }

    /// `valueString` against `value[x]`, in either direction
    fn is_choice_rename(&self, a: &str, b: &str) -> bool {
        fn renames(choice: &str, concrete: &str) -> bool {
            choice
                .strip_suffix("[x]")
                .and_then(|prefix| concrete.strip_prefix(prefix))
                .and_then(|suffix| suffix.chars().next())
                .is_some_and(char::is_uppercase)
        }
        self.settings.match_choice_renames && (renames(a, b) || renames(b, a))
    }

    fn find_base_group<'g, 'e>(
        &self,
        base_groups: &'g [SliceGroup<'e>],
        name: &str,
    ) -> Option<&'g SliceGroup<'e>> {
        base_groups
            .iter()
            .find(|g| g.name == name)
            .or_else(|| base_groups.iter().find(|g| self.is_choice_rename(g.name, name)))
    }

    /// Unnamed, unsliced elements against an unsliced base
    fn is_plain(
        &self,
        diff: &ElementDefinitionNavigator,
        diff_group: &SliceGroup<'_>,
        base_group: &SliceGroup<'_>,
    ) -> bool {
        let unnamed = diff_group
            .slots
            .iter()
            .all(|s| s.element.slice_name.is_none() && s.element.slicing.is_none());
        let identified_extension = self.settings.implicit_extension_slicing
            && diff_group
                .slots
                .iter()
                .any(|s| extension_identity(diff, s).is_some());

        unnamed && !identified_extension && !base_group.is_sliced()
    }

    fn match_plain(
        &self,
        state: &mut LevelState<'_>,
        diff_group: &SliceGroup<'_>,
        base_group: &SliceGroup<'_>,
    ) {
        for (i, d) in diff_group.slots.iter().enumerate() {
            match base_group.slots.get(i) {
                Some(b) if state.claimed.insert(b.bookmark) => {
                    state.push(MatchInfo::new(MatchAction::Merge, b.bookmark, d.bookmark));
                }
                _ => {
                    let issue = MatchIssue::warning(
                        IssueCode::Duplicate,
                        format!(
                            "Element '{}' is constrained more than once without a slice name",
                            d.element.path
                        ),
                    )
                    .with_location(d.element.key());
                    state.push(
                        MatchInfo::new(MatchAction::Add, Bookmark::empty(), d.bookmark)
                            .with_issue(issue),
                    );
                }
            }
        }
    }

    fn match_sliced(
        &self,
        state: &mut LevelState<'_>,
        diff_group: &SliceGroup<'_>,
        base_group: &SliceGroup<'_>,
    ) {
        let (base, diff) = (state.base, state.diff);
        let settings = &self.settings;
        let is_extension = settings.implicit_extension_slicing
            && (diff_group.is_extension() || base_group.is_extension());

        let base_entry = base_group
            .first()
            .filter(|s| is_slice_entry(base, s, settings))
            .copied();
        let base_members: Vec<(SliceSlot<'_>, Vec<SliceIdentity<'_>>)> = base_group
            .slots
            .iter()
            .filter(|s| base_entry.map_or(true, |e| e.bookmark != s.bookmark))
            .map(|s| (*s, member_identities(base, s, settings)))
            .collect();

        let (diff_entry, diff_members) = match diff_group.first() {
            Some(first) if is_slice_entry(diff, first, settings) => {
                (Some(*first), &diff_group.slots[1..])
            }
            _ => (None, &diff_group.slots[..]),
        };

        // Base element new slices are derived from, when they do not
        // reslice an existing member
        let default_context = base_entry
            .or_else(|| is_extension.then(|| base_group.first().copied()).flatten())
            .map_or(Bookmark::empty(), |s| s.bookmark);

        // An implied extension entry may reuse a member as context, which the
        // members below can still claim
        let context_unclaimed = !state.claimed.contains(&default_context);

        let mut member_matches = Vec::with_capacity(diff_members.len());
        let mut seen_names = HashSet::new();

        for d in diff_members {
            if let Some(name) = d.element.slice_name.as_deref() {
                if !seen_names.insert(name) {
                    let issue = MatchIssue::error(
                        IssueCode::Duplicate,
                        format!("Slice '{}' is defined more than once", d.element.key()),
                    )
                    .with_location(d.element.key());
                    member_matches.push(
                        MatchInfo::new(MatchAction::Add, default_context, d.bookmark)
                            .with_issue(issue),
                    );
                    continue;
                }
            }

            let identities = member_identities(diff, d, settings);
            if identities.is_empty() {
                let issue = MatchIssue::warning(
                    IssueCode::Duplicate,
                    format!(
                        "Element '{}' repeats without a slice name",
                        d.element.path
                    ),
                )
                .with_location(d.element.key());
                member_matches.push(
                    MatchInfo::new(MatchAction::Add, default_context, d.bookmark).with_issue(issue),
                );
                continue;
            }

            let target = identities.iter().find_map(|identity| {
                base_members
                    .iter()
                    .find(|(_, ids)| ids.contains(identity))
                    .map(|(slot, _)| *slot)
            });

            match target {
                Some(b) if !state.claimed.insert(b.bookmark) => {
                    let issue = MatchIssue::error(
                        IssueCode::Duplicate,
                        format!(
                            "Element '{}' matches base slice '{}' which is already constrained",
                            d.element.key(),
                            b.element.key()
                        ),
                    )
                    .with_location(d.element.key());
                    member_matches.push(
                        MatchInfo::new(MatchAction::Add, default_context, d.bookmark)
                            .with_issue(issue),
                    );
                }
                Some(b) => {
                    let mut info = if d.element.slicing.is_some() {
                        MatchInfo::new(MatchAction::Slice, b.bookmark, d.bookmark)
                    } else {
                        MatchInfo::new(MatchAction::Merge, b.bookmark, d.bookmark)
                    };
                    if let Some(issue) = self.discriminator_issue(is_extension, Some(&b), d) {
                        info = info.with_issue(issue);
                    }
                    member_matches.push(info);
                }
                None => {
                    let context = d
                        .element
                        .slice_name
                        .as_deref()
                        .and_then(|name| reslice_parent(name, settings.reslice_separator))
                        .and_then(|parent| {
                            let parent = SliceIdentity::Name(parent);
                            base_members
                                .iter()
                                .find(|(_, ids)| ids.contains(&parent))
                                .map(|(slot, _)| slot.bookmark)
                        })
                        .unwrap_or(default_context);
                    let mut info = MatchInfo::new(MatchAction::Add, context, d.bookmark);
                    if let Some(issue) = self.discriminator_issue(is_extension, None, d) {
                        info = info.with_issue(issue);
                    }
                    member_matches.push(info);
                }
            }
        }

        match diff_entry {
            Some(d) => {
                let info = match base_entry {
                    Some(b) if !state.claimed.insert(b.bookmark) => {
                        MatchInfo::new(MatchAction::Add, b.bookmark, d.bookmark).with_issue(
                            MatchIssue::error(
                                IssueCode::Duplicate,
                                format!(
                                    "Slice entry '{}' is defined more than once",
                                    d.element.path
                                ),
                            )
                            .with_location(d.element.key()),
                        )
                    }
                    _ => {
                        let base_bookmark = base_entry.map_or(Bookmark::empty(), |b| b.bookmark);
                        let info = MatchInfo::new(MatchAction::Slice, base_bookmark, d.bookmark);
                        match self.discriminator_issue(is_extension, base_entry.as_ref(), &d) {
                            Some(issue) => info.with_issue(issue),
                            None => info,
                        }
                    }
                };
                state.push(info);
            }
            None => {
                let any_add = member_matches.iter().any(|m| m.action == MatchAction::Add);
                if is_extension {
                    if context_unclaimed {
                        state.push(MatchInfo::new(
                            MatchAction::Slice,
                            default_context,
                            Bookmark::empty(),
                        ));
                    }
                } else if let Some(b) = base_entry {
                    if b.element.slicing.is_none() {
                        let issue = MatchIssue::warning(
                            IssueCode::Incomplete,
                            format!(
                                "Slices are introduced on '{}' without a slice entry",
                                b.element.path
                            ),
                        )
                        .with_location(b.element.key());
                        state.push(
                            MatchInfo::new(MatchAction::Slice, b.bookmark, Bookmark::empty())
                                .with_issue(issue),
                        );
                    } else if any_add {
                        state.push(MatchInfo::new(
                            MatchAction::Slice,
                            b.bookmark,
                            Bookmark::empty(),
                        ));
                    }
                }
            }
        }

        for info in member_matches {
            state.push(info);
        }
    }

    /// Issue for a slicing declaration that has no discriminator on either
    /// side. Extensions are always discriminated by url.
    fn discriminator_issue(
        &self,
        is_extension: bool,
        base: Option<&SliceSlot<'_>>,
        diff: &SliceSlot<'_>,
    ) -> Option<MatchIssue> {
        if is_extension || !self.settings.report_missing_discriminators {
            return None;
        }
        if !discriminators_missing(base.map(|b| b.element), diff.element) {
            return None;
        }
        Some(
            MatchIssue::warning(
                IssueCode::Required,
                format!(
                    "Slicing on '{}' does not declare a discriminator",
                    diff.element.key()
                ),
            )
            .with_location(diff.element.key()),
        )
    }
}

/// Render a match list, one line per match, for debugging
pub fn describe_matches(
    matches: &[MatchInfo],
    base: &ElementDefinitionNavigator,
    diff: &ElementDefinitionNavigator,
) -> String {
    let describe = |nav: &ElementDefinitionNavigator, bookmark: &Bookmark| {
        if bookmark.is_empty() {
            return "-".to_string();
        }
        let mut cursor = nav.clone();
        if !cursor.restore(bookmark) {
            return "?".to_string();
        }
        cursor.current().map_or_else(|| cursor.path(), |e| e.key())
    };

    matches
        .iter()
        .map(|m| {
            let mut line = format!(
                "{:<5} {} <- {}",
                m.action,
                describe(base, &m.base_bookmark),
                describe(diff, &m.diff_bookmark)
            );
            if let Some(issue) = &m.issue {
                line.push_str(&format!(" [{}: {}]", issue.code, issue.diagnostics));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrum_models::ElementDefinition;

    fn nav(paths: &[&str]) -> ElementDefinitionNavigator {
        ElementDefinitionNavigator::new(paths.iter().map(|p| ElementDefinition::new(*p)).collect())
    }

    #[test]
    fn rejects_mismatched_positions() {
        let matcher = ElementMatcher::default();
        let mut base = nav(&["Patient", "Patient.name"]);
        let mut diff = nav(&["Patient", "Patient.name"]);

        base.move_to_first_child(None);
        assert!(matches!(
            matcher.match_children(&base, &diff),
            Err(Error::Structure(_))
        ));

        diff.move_to_first_child(None);
        diff.move_to_child("name");
        assert!(matches!(
            matcher.match_children(&base, &diff),
            Err(Error::Structure(_))
        ));
    }

    #[test]
    fn choice_rename_is_accepted_as_position() {
        let matcher = ElementMatcher::default();
        assert!(matcher.is_choice_rename("value[x]", "valueString"));
        assert!(matcher.is_choice_rename("valueQuantity", "value[x]"));
        assert!(!matcher.is_choice_rename("value[x]", "valuestring"));
        assert!(!matcher.is_choice_rename("value[x]", "value"));

        let strict = ElementMatcher::new(MatcherSettings {
            match_choice_renames: false,
            ..Default::default()
        });
        assert!(!strict.is_choice_rename("value[x]", "valueString"));
    }

    #[test]
    fn leaf_diff_has_no_matches() {
        let matcher = ElementMatcher::default();
        let mut base = nav(&["Patient", "Patient.name"]);
        let mut diff = nav(&["Patient"]);
        base.move_to_first_child(None);
        diff.move_to_first_child(None);
        assert!(matcher.match_children(&base, &diff).unwrap().is_empty());
    }

    #[test]
    fn describes_matches() {
        let matcher = ElementMatcher::default();
        let base = nav(&["Patient"]);
        let diff = nav(&["Patient"]);
        let matches = matcher.match_children(&base, &diff).unwrap();
        assert_eq!(describe_matches(&matches, &base, &diff), "Merge Patient <- Patient");
    }
}
