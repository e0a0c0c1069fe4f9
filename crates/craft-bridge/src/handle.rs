//! Identity wrappers for outline nodes.
//!
//! Outline widgets reference their rows by object identity and hold on to
//! those objects between callbacks. The store issues one [`HandleId`] per
//! distinct node so that asking for the same `(section, item)` twice returns
//! the same handle, and resolves a handle back to its indices.

use std::collections::HashMap;

/// Opaque identifier for a wrapper issued by a [`HandleStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    /// Raw value, used when the handle has to cross into native objects.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Rebuild a handle from a raw value previously obtained from [`Self::raw`].
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Position of a node in the two-level sidebar tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeIndex {
    /// Index of the section.
    pub section: u32,
    /// Index of the item within the section; `None` for the section itself.
    pub item: Option<u32>,
}

impl NodeIndex {
    /// Index of a section node.
    #[must_use]
    pub const fn section(section: u32) -> Self {
        Self {
            section,
            item: None,
        }
    }

    /// Index of an item node.
    #[must_use]
    pub const fn item(section: u32, item: u32) -> Self {
        Self {
            section,
            item: Some(item),
        }
    }

    /// True for section (group) nodes.
    #[must_use]
    pub const fn is_section(self) -> bool {
        self.item.is_none()
    }
}

/// Issues and resolves identity handles for one tree snapshot.
///
/// Handles start at 1 so that a zero raw value never names a node.
#[derive(Debug)]
pub struct HandleStore {
    /// Next raw id to hand out.
    next: u64,
    /// Handle to indices.
    by_handle: HashMap<HandleId, NodeIndex>,
    /// Indices to handle, for reuse.
    by_index: HashMap<NodeIndex, HandleId>,
}

impl Default for HandleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: 1,
            by_handle: HashMap::new(),
            by_index: HashMap::new(),
        }
    }

    /// Return the handle for `index`, creating it on first request.
    pub fn handle_for(&mut self, index: NodeIndex) -> HandleId {
        if let Some(h) = self.by_index.get(&index) {
            return *h;
        }
        let h = HandleId(self.next);
        self.next += 1;
        self.by_handle.insert(h, index);
        self.by_index.insert(index, h);
        h
    }

    /// Resolve a handle issued by this store.
    #[must_use]
    pub fn resolve(&self, handle: HandleId) -> Option<NodeIndex> {
        self.by_handle.get(&handle).copied()
    }

    /// Number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    /// True when no handles have been issued since the last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    /// Drop every handle. Raw ids keep increasing so stale handles held by a
    /// widget never alias nodes of the new snapshot.
    pub fn reset(&mut self) {
        self.by_handle.clear();
        self.by_index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_index_returns_same_handle() {
        let mut store = HandleStore::new();
        let a = store.handle_for(NodeIndex::item(0, 2));
        let b = store.handle_for(NodeIndex::item(0, 2));
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.resolve(a), Some(NodeIndex::item(0, 2)));
    }

    #[test]
    fn section_and_item_handles_differ() {
        let mut store = HandleStore::new();
        let s = store.handle_for(NodeIndex::section(0));
        let i = store.handle_for(NodeIndex::item(0, 0));
        assert_ne!(s, i);
        assert!(store.resolve(s).unwrap().is_section());
        assert!(!store.resolve(i).unwrap().is_section());
    }

    #[test]
    fn reset_invalidates_without_reusing_ids() {
        let mut store = HandleStore::new();
        let old = store.handle_for(NodeIndex::section(0));
        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.resolve(old), None);
        let new = store.handle_for(NodeIndex::section(0));
        assert_ne!(old, new);
        assert!(new.raw() > old.raw());
    }
}
