//! Restorable cursor positions

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Identity of one child sequence owned by a navigator and its clones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceId(u64);

impl SequenceId {
    /// Allocate a process-wide unique id
    pub fn next() -> Self {
        Self(NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Captured navigator position.
///
/// A bookmark is only meaningful to the navigator that produced it (or a
/// clone of it). Two bookmarks are equal when they point at the same
/// position of the same sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bookmark {
    sequence: Option<SequenceId>,
    parent: Option<usize>,
    index: Option<usize>,
}

impl Bookmark {
    /// The "no position" bookmark
    pub const fn empty() -> Self {
        Self {
            sequence: None,
            parent: None,
            index: None,
        }
    }

    pub(crate) fn new(sequence: SequenceId, parent: Option<usize>, index: Option<usize>) -> Self {
        Self {
            sequence: Some(sequence),
            parent,
            index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_none()
    }

    pub fn sequence(&self) -> Option<SequenceId> {
        self.sequence
    }

    /// Slot of the parent node the sequence belongs to
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Position within the sequence; `None` means before the first child
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}
