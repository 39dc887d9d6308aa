//! Navigator over a typed instance graph
//!
//! Children are produced by [`FhirNode::children`] when a node is entered,
//! never ahead of time.

use crate::bookmark::{Bookmark, SequenceId};
use crate::navigator::ElementNavigator;
use ferrum_models::{ChildValue, FhirNode, NamedChild, ScalarValue};
use phf::phf_set;
use std::sync::Arc;

/// Quantity profiles reported as plain `Quantity`
static QUANTITY_PROFILES: phf::Set<&'static str> = phf_set! {
    "Age",
    "Count",
    "Distance",
    "Duration",
    "MoneyQuantity",
    "SimpleQuantity",
};

#[derive(Debug, Clone)]
struct Level<'a> {
    sequence: SequenceId,
    children: Arc<[NamedChild<'a>]>,
    index: Option<usize>,
    array_index: Option<usize>,
}

/// Cursor over a `&dyn FhirNode` graph
#[derive(Debug, Clone)]
pub struct TypedElementNavigator<'a> {
    /// Entered levels, the root level first
    levels: Vec<Level<'a>>,
}

impl<'a> TypedElementNavigator<'a> {
    /// Navigator positioned on `root`, named after its type
    pub fn new(root: &'a dyn FhirNode) -> Self {
        Self::with_name(root.type_name(), root)
    }

    pub fn with_name(name: &'a str, root: &'a dyn FhirNode) -> Self {
        let children: Arc<[NamedChild<'a>]> = Arc::from(vec![NamedChild::node(name, root)]);
        Self {
            levels: vec![Level {
                sequence: SequenceId::next(),
                children,
                index: Some(0),
                array_index: None,
            }],
        }
    }

    fn level(&self) -> &Level<'a> {
        // levels is never empty: the root level is never popped
        &self.levels[self.levels.len() - 1]
    }

    fn current_child(&self) -> Option<&NamedChild<'a>> {
        let level = self.level();
        level.index.map(|i| &level.children[i])
    }

    /// The complex node under the cursor
    pub fn current_node(&self) -> Option<&'a dyn FhirNode> {
        self.current_child()?.as_node()
    }

    /// Number of levels entered below the root
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }
}

fn attribute_type(name: &str) -> Option<&'static str> {
    match name {
        "url" => Some("uri"),
        "id" => Some("id"),
        "div" => Some("xhtml"),
        _ => {
            tracing::warn!(attribute = %name, "unknown attribute element, type not reported");
            None
        }
    }
}

impl<'a> ElementNavigator for TypedElementNavigator<'a> {
    fn enter_children(&mut self) -> bool {
        let Some(node) = self.current_node() else {
            return false;
        };
        let children = node.children();
        if children.is_empty() {
            return false;
        }

        tracing::trace!(node = node.type_name(), count = children.len(), "entering children");
        self.levels.push(Level {
            sequence: SequenceId::next(),
            children: children.into(),
            index: None,
            array_index: None,
        });
        true
    }

    fn move_next(&mut self, name: Option<&str>) -> bool {
        let last = self.levels.len() - 1;
        let level = &mut self.levels[last];
        let start = level.index.map_or(0, |i| i + 1);
        let previous_name = level.index.map(|i| level.children[i].name);

        let Some(offset) = level.children[start..]
            .iter()
            .position(|c| name.map_or(true, |n| n == c.name))
        else {
            return false;
        };

        let next = start + offset;
        let child = &level.children[next];
        level.array_index = if previous_name == Some(child.name) {
            Some(level.array_index.map_or(1, |i| i + 1))
        } else if child.is_collection {
            Some(0)
        } else {
            None
        };
        level.index = Some(next);
        true
    }

    fn name(&self) -> Option<&str> {
        self.current_child().map(|c| c.name)
    }

    fn array_index(&self) -> Option<usize> {
        self.level().array_index
    }

    fn type_name(&self) -> Option<&str> {
        let child = self.current_child()?;
        match &child.value {
            ChildValue::Attribute(_) => attribute_type(child.name),
            ChildValue::Node(node) => {
                let type_name = node.type_name();
                if QUANTITY_PROFILES.contains(type_name) {
                    Some("Quantity")
                } else {
                    Some(type_name)
                }
            }
            ChildValue::Primitive(p) => Some(p.type_name()),
        }
    }

    fn path(&self) -> String {
        let mut segments = Vec::with_capacity(self.levels.len());
        for level in &self.levels {
            let Some(index) = level.index else {
                break;
            };
            let child = &level.children[index];
            match level.array_index {
                Some(i) => segments.push(format!("{}[{}]", child.name, i)),
                None => segments.push(child.name.to_string()),
            }
        }
        segments.join(".")
    }

    fn bookmark(&self) -> Bookmark {
        let depth = self.levels.len() - 1;
        let parent = depth
            .checked_sub(1)
            .and_then(|p| self.levels[p].index);
        let level = self.level();
        Bookmark::new(level.sequence, parent, level.index)
    }

    fn restore(&mut self, bookmark: &Bookmark) -> bool {
        let Some(sequence) = bookmark.sequence() else {
            return false;
        };
        let Some(depth) = self.levels.iter().position(|l| l.sequence == sequence) else {
            return false;
        };

        let parent = depth.checked_sub(1).and_then(|p| self.levels[p].index);
        if parent != bookmark.parent() {
            return false;
        }
        let level = &self.levels[depth];
        if bookmark.index().is_some_and(|i| i >= level.children.len()) {
            return false;
        }

        self.levels.truncate(depth + 1);
        let level = &mut self.levels[depth];
        level.index = bookmark.index();
        level.array_index = bookmark.index().and_then(|index| {
            let name = level.children[index].name;
            let preceding = level.children[..index]
                .iter()
                .rev()
                .take_while(|c| c.name == name)
                .count();
            (preceding > 0 || level.children[index].is_collection).then_some(preceding)
        });
        true
    }

    fn value(&self) -> Option<ScalarValue> {
        match &self.current_child()?.value {
            ChildValue::Primitive(p) => Some(p.normalize()),
            ChildValue::Attribute(s) => Some(ScalarValue::String((*s).to_string())),
            ChildValue::Node(_) => None,
        }
    }
}
