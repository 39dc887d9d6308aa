//! Generic cursor over named, possibly repeated child nodes

use crate::bookmark::Bookmark;
use ferrum_models::ScalarValue;

/// A cursor walking one level of a tree at a time.
///
/// Children of a node form an ordered sequence in which same-named siblings
/// are contiguous. `array_index` tracks the position within such a run.
pub trait ElementNavigator: Clone {
    /// Descend into the children of the current node. The cursor ends up
    /// before the first child. Returns false (cursor unchanged) for leaves.
    fn enter_children(&mut self) -> bool;

    /// Advance to the next sibling, optionally the next one with `name`.
    /// Returns false (cursor unchanged) when no such sibling remains.
    fn move_next(&mut self, name: Option<&str>) -> bool;

    /// Name of the current node
    fn name(&self) -> Option<&str>;

    /// Position within the run of same-named siblings, `None` when the
    /// element does not repeat
    fn array_index(&self) -> Option<usize>;

    /// FHIR type of the current node
    fn type_name(&self) -> Option<&str>;

    /// Dotted path of the current node
    fn path(&self) -> String;

    fn bookmark(&self) -> Bookmark;

    /// Return to a bookmarked position. Returns false (cursor unchanged) if
    /// the bookmark does not belong to this navigator.
    fn restore(&mut self, bookmark: &Bookmark) -> bool;

    /// Normalized scalar value of the current leaf
    fn value(&self) -> Option<ScalarValue>;

    /// Move to the first child, or the first child called `name`
    fn move_to_first_child(&mut self, name: Option<&str>) -> bool {
        let mut cursor = self.clone();
        if cursor.enter_children() && cursor.move_next(name) {
            *self = cursor;
            true
        } else {
            false
        }
    }

    fn move_to_child(&mut self, name: &str) -> bool {
        self.move_to_first_child(Some(name))
    }
}
