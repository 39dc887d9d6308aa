//! FHIR Profile Element Matching
//!
//! This crate aligns the differential of a profile with the snapshot of its
//! base definition, the first step of snapshot generation. For every
//! differential element it decides whether the element constrains an
//! existing base element (merge), opens or extends slicing (slice), or
//! introduces a new element (add).
//!
//! Matching works on navigators: cursors that walk a tree one level at a
//! time and can bookmark positions. [`ElementDefinitionNavigator`] walks a
//! flat element-definition list, [`TypedElementNavigator`] walks a typed
//! instance graph.
//!
//! # Example
//!
//! ```rust
//! use ferrum_matcher::{ElementDefinitionNavigator, ElementMatcher, MatchAction};
//! use ferrum_models::ElementDefinition;
//!
//! let base = ElementDefinitionNavigator::new(vec![
//!     ElementDefinition::new("Patient"),
//!     ElementDefinition::new("Patient.identifier"),
//! ]);
//! let diff = ElementDefinitionNavigator::new(vec![ElementDefinition::new("Patient")]);
//!
//! let matches = ElementMatcher::default().match_children(&base, &diff).unwrap();
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].action, MatchAction::Merge);
//! ```

pub mod alignment;
pub mod bookmark;
pub mod definition_navigator;
pub mod differential;
pub mod error;
pub mod issue;
pub mod matcher;
pub mod navigator;
pub mod settings;
pub mod slicing;
pub mod typed_navigator;

pub use alignment::{align, all_merge, count_actions, issues, ActionCounts, AlignedElement};
pub use bookmark::{Bookmark, SequenceId};
pub use definition_navigator::ElementDefinitionNavigator;
pub use differential::complete_differential;
pub use error::{Error, Result};
pub use issue::{issues_to_operation_outcome, IssueCode, IssueSeverity, MatchIssue};
pub use matcher::{describe_matches, ElementMatcher, MatchAction, MatchInfo};
pub use navigator::ElementNavigator;
pub use settings::MatcherSettings;
pub use typed_navigator::TypedElementNavigator;
