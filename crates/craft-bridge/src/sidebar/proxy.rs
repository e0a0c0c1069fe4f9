//! Outline data source over the sidebar tree.
//!
//! The outline widget asks questions about opaque nodes; this proxy answers
//! them from the current [`SidebarSection`] list. A configuration load swaps
//! the entire tree and invalidates every handle issued for the previous one,
//! so stale nodes the widget still holds resolve to nothing and are ignored.

use serde_json::json;
use tracing::{debug, warn};

use super::model::{SidebarItem, SidebarSection, default_sections, parse_sections};
use crate::{
    error::Result,
    handle::{HandleId, HandleStore, NodeIndex},
    script::Replier,
};

/// Event dispatched to script when a row is selected.
pub const SELECT_EVENT: &str = "craft:sidebar:select";

/// A node as seen by the outline widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// The invisible root (the widget passes nil).
    Root,
    /// A section or item wrapper.
    Handle(HandleId),
}

/// What to draw for a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Group header row.
    Header {
        /// Section title.
        title: String,
    },
    /// Selectable row.
    Row {
        /// Item label.
        label: String,
        /// Symbol name.
        icon: String,
        /// Trailing badge.
        badge: Option<String>,
        /// Icon tint.
        tint_color: Option<String>,
    },
}

/// Data source state for one outline widget.
pub struct SidebarProxy {
    /// Active tree.
    sections: Vec<SidebarSection>,
    /// Wrappers issued for the active tree.
    handles: HandleStore,
    /// Where selection events go.
    replier: Replier,
}

impl SidebarProxy {
    /// Create a proxy showing the built-in default tree.
    pub fn new(replier: Replier) -> Self {
        Self::with_sections(default_sections(), replier)
    }

    /// Create a proxy over an explicit tree.
    pub fn with_sections(sections: Vec<SidebarSection>, replier: Replier) -> Self {
        Self {
            sections,
            handles: HandleStore::new(),
            replier,
        }
    }

    /// Replace the tree from a configuration document.
    ///
    /// The document is parsed completely before anything changes; on error
    /// the current tree stays active and the error is logged and returned.
    pub fn load_config(&mut self, json: &str) -> Result<usize> {
        match parse_sections(json) {
            Ok(sections) => {
                debug!(sections = sections.len(), "sidebar config loaded");
                self.replace(sections);
                Ok(self.sections.len())
            }
            Err(e) => {
                warn!("sidebar config rejected, keeping current tree: {}", e);
                Err(e)
            }
        }
    }

    /// Swap in a new tree and drop all handles for the old one.
    pub fn replace(&mut self, sections: Vec<SidebarSection>) {
        self.sections = sections;
        self.handles.reset();
    }

    /// Active tree.
    pub fn sections(&self) -> &[SidebarSection] {
        &self.sections
    }

    /// Resolve `node` against the active tree. `None` for the root, for
    /// unknown handles and for indices that no longer exist.
    pub fn resolve(&self, node: Node) -> Option<NodeIndex> {
        let Node::Handle(h) = node else {
            return None;
        };
        let idx = self.handles.resolve(h)?;
        let section = self.sections.get(idx.section as usize)?;
        if let Some(item) = idx.item
            && item as usize >= section.items.len()
        {
            return None;
        }
        Some(idx)
    }

    /// Item behind `node`, if it is a live item handle.
    pub fn item(&self, node: Node) -> Option<(&SidebarSection, &SidebarItem)> {
        let idx = self.resolve(node)?;
        let section = &self.sections[idx.section as usize];
        let item = section.items.get(idx.item? as usize)?;
        Some((section, item))
    }

    /// Number of children of `parent`.
    pub fn child_count(&self, parent: Node) -> usize {
        match parent {
            Node::Root => self.sections.len(),
            Node::Handle(_) => match self.resolve(parent) {
                Some(NodeIndex {
                    section,
                    item: None,
                }) => self.sections[section as usize].items.len(),
                _ => 0,
            },
        }
    }

    /// Child `index` of `parent`, as a stable handle.
    pub fn child_at(&mut self, index: usize, parent: Node) -> Option<HandleId> {
        let target = match parent {
            Node::Root => {
                if index >= self.sections.len() {
                    return None;
                }
                NodeIndex::section(u32::try_from(index).ok()?)
            }
            Node::Handle(_) => {
                let idx = self.resolve(parent)?;
                if !idx.is_section() || index >= self.sections[idx.section as usize].items.len() {
                    return None;
                }
                NodeIndex::item(idx.section, u32::try_from(index).ok()?)
            }
        };
        Some(self.handles.handle_for(target))
    }

    /// Sections expand; items do not.
    pub fn is_expandable(&self, node: Node) -> bool {
        self.resolve(node).is_some_and(NodeIndex::is_section)
    }

    /// Sections render as group headers.
    pub fn is_group_header(&self, node: Node) -> bool {
        self.is_expandable(node)
    }

    /// Only items can be selected.
    pub fn should_select(&self, node: Node) -> bool {
        self.resolve(node).is_some_and(|i| !i.is_section())
    }

    /// Whether a section starts collapsed.
    pub fn is_collapsed(&self, node: Node) -> bool {
        self.resolve(node)
            .filter(|i| i.is_section())
            .is_some_and(|i| self.sections[i.section as usize].collapsed)
    }

    /// Content to render for `node`.
    pub fn cell(&self, node: Node) -> Option<CellContent> {
        let idx = self.resolve(node)?;
        let section = &self.sections[idx.section as usize];
        match idx.item {
            None => Some(CellContent::Header {
                title: section.title.clone(),
            }),
            Some(i) => {
                let item = &section.items[i as usize];
                Some(CellContent::Row {
                    label: item.label.clone(),
                    icon: item.icon.clone(),
                    badge: item.badge.clone(),
                    tint_color: item.tint_color.clone(),
                })
            }
        }
    }

    /// Report a selection to script.
    ///
    /// Emits [`SELECT_EVENT`] with `{itemId, sectionId, item}`. Returns false
    /// (and emits nothing) for sections and stale or unknown nodes.
    pub fn selection_changed(&self, node: Node) -> bool {
        let Some((section, item)) = self.item(node) else {
            debug!(?node, "ignoring selection of non-item node");
            return false;
        };
        self.replier.event(
            SELECT_EVENT,
            json!({
                "itemId": item.id,
                "sectionId": section.id,
                "item": item,
            }),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{ReplyQueue, ScriptCall};

    const TWO_SECTIONS: &str = r#"{"sections":[
        {"id":"a","title":"A","items":[{"id":"a1"},{"id":"a2"}]},
        {"id":"b","title":"B","collapsed":true,"items":[]}
    ]}"#;

    fn proxy() -> (SidebarProxy, ReplyQueue) {
        let q = ReplyQueue::new();
        let mut p = SidebarProxy::new(q.replier());
        p.load_config(TWO_SECTIONS).unwrap();
        (p, q)
    }

    #[test]
    fn counts_follow_tree_shape() {
        let (mut p, _q) = proxy();
        assert_eq!(p.child_count(Node::Root), 2);
        let a = Node::Handle(p.child_at(0, Node::Root).unwrap());
        let b = Node::Handle(p.child_at(1, Node::Root).unwrap());
        assert_eq!(p.child_count(a), 2);
        assert_eq!(p.child_count(b), 0);
        let a1 = Node::Handle(p.child_at(0, a).unwrap());
        assert_eq!(p.child_count(a1), 0);
        assert!(p.child_at(0, a1).is_none());
        assert!(p.child_at(2, a).is_none());
        assert!(p.child_at(2, Node::Root).is_none());
        assert!(p.is_collapsed(b));
        assert!(!p.is_collapsed(a));
    }

    #[test]
    fn only_items_are_selectable() {
        let (mut p, _q) = proxy();
        let a = Node::Handle(p.child_at(0, Node::Root).unwrap());
        let a2 = Node::Handle(p.child_at(1, a).unwrap());
        assert!(p.is_expandable(a) && p.is_group_header(a) && !p.should_select(a));
        assert!(!p.is_expandable(a2) && !p.is_group_header(a2) && p.should_select(a2));
        assert!(!p.should_select(Node::Root));
    }

    #[test]
    fn cells_render_header_and_row() {
        let (mut p, _q) = proxy();
        let a = Node::Handle(p.child_at(0, Node::Root).unwrap());
        let a1 = Node::Handle(p.child_at(0, a).unwrap());
        assert_eq!(
            p.cell(a),
            Some(CellContent::Header {
                title: "A".into()
            })
        );
        assert!(matches!(p.cell(a1), Some(CellContent::Row { ref label, ref icon, .. }) if label == "Item" && icon == "doc"));
    }

    #[test]
    fn stale_handles_are_ignored_after_reload() {
        let (mut p, q) = proxy();
        let a = Node::Handle(p.child_at(0, Node::Root).unwrap());
        let a1 = Node::Handle(p.child_at(0, a).unwrap());
        p.load_config(r#"{"sections":[]}"#).unwrap();
        assert_eq!(p.child_count(a), 0);
        assert!(!p.selection_changed(a1));
        assert!(q.drain().is_empty());
    }

    #[test]
    fn selecting_section_emits_nothing() {
        let (mut p, q) = proxy();
        let a = Node::Handle(p.child_at(0, Node::Root).unwrap());
        assert!(!p.selection_changed(a));
        assert!(!p.selection_changed(Node::Root));
        assert!(q.drain().is_empty());
    }

    #[test]
    fn selection_event_carries_ids() {
        let (mut p, q) = proxy();
        let a = Node::Handle(p.child_at(0, Node::Root).unwrap());
        let a2 = Node::Handle(p.child_at(1, a).unwrap());
        assert!(p.selection_changed(a2));
        let calls = q.drain();
        assert_eq!(calls.len(), 1);
        let ScriptCall::Event { name, detail } = &calls[0] else {
            panic!("expected event, got {:?}", calls[0]);
        };
        assert_eq!(name, SELECT_EVENT);
        assert_eq!(detail["itemId"], "a2");
        assert_eq!(detail["sectionId"], "a");
    }
}
