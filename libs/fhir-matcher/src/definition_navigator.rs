//! Navigator over a flat element-definition list
//!
//! The list is the snapshot or differential of a StructureDefinition. Tree
//! structure is implied by the dotted paths: the children of an element are
//! the following elements one segment deeper, up to the first element that
//! is no longer a descendant. Slices of an element repeat its path, so each
//! slice owns the child elements listed after it.

use crate::bookmark::{Bookmark, SequenceId};
use crate::differential::complete_differential;
use crate::error::Result;
use crate::navigator::ElementNavigator;
use ferrum_models::{ElementDefinition, Primitive, ScalarValue, StructureDefinition};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Unpositioned; children are the root elements
    Root,
    /// Entered a level but not yet on a child. `None` parent is the root level.
    BeforeFirst { parent: Option<usize> },
    At { parent: Option<usize>, index: usize },
}

/// Cursor over an element-definition list
#[derive(Debug, Clone)]
pub struct ElementDefinitionNavigator {
    elements: Arc<[ElementDefinition]>,
    sequence: SequenceId,
    cursor: Cursor,
    array_index: Option<usize>,
}

impl ElementDefinitionNavigator {
    /// Navigator over an already complete element tree, starting unpositioned
    pub fn new(elements: Vec<ElementDefinition>) -> Self {
        Self {
            elements: elements.into(),
            sequence: SequenceId::next(),
            cursor: Cursor::Root,
            array_index: None,
        }
    }

    /// Navigator over the snapshot of a structure definition
    pub fn for_snapshot(sd: &StructureDefinition) -> Result<Self> {
        Ok(Self::new(sd.snapshot_elements()?.to_vec()))
    }

    /// Navigator over the differential of a structure definition. Missing
    /// ancestors are filled in so the differential navigates as a tree.
    pub fn for_differential(sd: &StructureDefinition) -> Result<Self> {
        Ok(Self::new(complete_differential(sd.differential_elements()?)))
    }

    pub fn elements(&self) -> &[ElementDefinition] {
        &self.elements
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Index of the current element in the list
    pub fn ordinal_position(&self) -> Option<usize> {
        match self.cursor {
            Cursor::At { index, .. } => Some(index),
            _ => None,
        }
    }

    /// The element under the cursor
    pub fn current(&self) -> Option<&ElementDefinition> {
        self.ordinal_position().map(|i| &self.elements[i])
    }

    /// True when the navigator is unpositioned (at the virtual root)
    pub fn is_at_root(&self) -> bool {
        self.cursor == Cursor::Root
    }

    pub fn has_children(&self) -> bool {
        match self.cursor {
            Cursor::Root => !self.elements.is_empty(),
            Cursor::At { index, .. } => self.next_child(Some(index), None).is_some(),
            Cursor::BeforeFirst { .. } => false,
        }
    }

    /// Last path segment of the current element
    pub fn path_name(&self) -> Option<&str> {
        self.current().map(ElementDefinition::path_name)
    }

    /// Next child of `parent` after position `after` (or the first child)
    fn next_child(&self, parent: Option<usize>, after: Option<usize>) -> Option<usize> {
        let start = match (after, parent) {
            (Some(after), _) => after + 1,
            (None, Some(parent)) => parent + 1,
            (None, None) => 0,
        };

        match parent {
            None => (start..self.elements.len()).find(|&i| self.elements[i].depth() == 0),
            Some(parent) => {
                let parent_elem = &self.elements[parent];
                let child_depth = parent_elem.depth() + 1;
                self.elements[start..]
                    .iter()
                    .take_while(|e| e.is_descendant_of(&parent_elem.path))
                    .position(|e| e.depth() == child_depth)
                    .map(|offset| start + offset)
            }
        }
    }

    fn is_child(&self, parent: Option<usize>, index: usize) -> bool {
        let Some(element) = self.elements.get(index) else {
            return false;
        };
        match parent {
            None => element.depth() == 0,
            Some(parent) if parent < index => {
                let parent_elem = &self.elements[parent];
                element.is_child_of(&parent_elem.path)
                    && self.elements[parent + 1..index]
                        .iter()
                        .all(|e| e.is_descendant_of(&parent_elem.path))
            }
            Some(_) => false,
        }
    }

    /// Array index for the element at `index`, from the run of same-named
    /// siblings preceding it
    fn compute_array_index(&self, parent: Option<usize>, index: usize) -> Option<usize> {
        let name = self.elements[index].path_name();
        let mut preceding = 0;
        let mut cursor = self.next_child(parent, None);
        while let Some(i) = cursor {
            if i >= index {
                break;
            }
            if self.elements[i].path_name() == name {
                preceding += 1;
            } else {
                preceding = 0;
            }
            cursor = self.next_child(parent, Some(i));
        }

        if preceding == 0 && !self.elements[index].is_array() {
            None
        } else {
            Some(preceding)
        }
    }
}

impl ElementNavigator for ElementDefinitionNavigator {
    fn enter_children(&mut self) -> bool {
        let parent = match self.cursor {
            Cursor::Root => None,
            Cursor::At { index, .. } => Some(index),
            Cursor::BeforeFirst { .. } => return false,
        };

        if self.next_child(parent, None).is_none() {
            return false;
        }

        self.cursor = Cursor::BeforeFirst { parent };
        self.array_index = None;
        true
    }

    fn move_next(&mut self, name: Option<&str>) -> bool {
        let (parent, mut after) = match self.cursor {
            Cursor::Root => return false,
            Cursor::BeforeFirst { parent } => (parent, None),
            Cursor::At { parent, index } => (parent, Some(index)),
        };
        let previous_name = after.map(|i| self.elements[i].path_name());

        while let Some(next) = self.next_child(parent, after) {
            let next_name = self.elements[next].path_name();
            if name.is_some_and(|n| n != next_name) {
                after = Some(next);
                continue;
            }

            self.array_index = if previous_name == Some(next_name) {
                Some(self.array_index.map_or(1, |i| i + 1))
            } else if self.elements[next].is_array() {
                Some(0)
            } else {
                None
            };
            self.cursor = Cursor::At {
                parent,
                index: next,
            };
            return true;
        }

        false
    }

    fn name(&self) -> Option<&str> {
        self.path_name()
    }

    fn array_index(&self) -> Option<usize> {
        self.array_index
    }

    fn type_name(&self) -> Option<&str> {
        self.current()?
            .types
            .as_ref()?
            .first()
            .map(|t| t.code.as_str())
    }

    fn path(&self) -> String {
        match self.cursor {
            Cursor::Root | Cursor::BeforeFirst { parent: None } => String::new(),
            Cursor::BeforeFirst {
                parent: Some(index),
            }
            | Cursor::At { index, .. } => self.elements[index].path.clone(),
        }
    }

    fn bookmark(&self) -> Bookmark {
        match self.cursor {
            Cursor::Root => Bookmark::empty(),
            Cursor::BeforeFirst { parent } => Bookmark::new(self.sequence, parent, None),
            Cursor::At { parent, index } => Bookmark::new(self.sequence, parent, Some(index)),
        }
    }

    fn restore(&mut self, bookmark: &Bookmark) -> bool {
        if bookmark.is_empty() {
            self.cursor = Cursor::Root;
            self.array_index = None;
            return true;
        }
        if bookmark.sequence() != Some(self.sequence) {
            return false;
        }

        let parent = bookmark.parent();
        if parent.is_some_and(|p| p >= self.elements.len()) {
            return false;
        }

        match bookmark.index() {
            None => {
                self.cursor = Cursor::BeforeFirst { parent };
                self.array_index = None;
                true
            }
            Some(index) if self.is_child(parent, index) => {
                self.cursor = Cursor::At { parent, index };
                self.array_index = self.compute_array_index(parent, index);
                true
            }
            Some(index) => {
                tracing::trace!(index, "bookmark does not point at a child of its parent");
                false
            }
        }
    }

    fn value(&self) -> Option<ScalarValue> {
        let (suffix, value) = self.current()?.fixed_value()?;
        let mut type_code = suffix.to_string();
        if let Some(first) = type_code.get_mut(..1) {
            first.make_ascii_lowercase();
        }
        Primitive::from_json(&type_code, value)
            .ok()
            .map(|p| p.normalize())
    }
}
