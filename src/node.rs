//! Host tree elements.
//!
//! The host (page logic, template layout) owns every [`Element`] through a
//! [`NodeHandle`]. Components only ever keep a [`WeakNode`], so dropping the
//! host's handle is indistinguishable from removing the node from the tree.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::ops::Range;
use std::rc::{Rc, Weak};

/// Tags that carry no visual content and are never adopted.
const AUXILIARY_TAGS: &[&str] = &["style", "script", "template", "link", "meta"];

// ============================================================================
// Element
// ============================================================================

/// A single visual node in the host tree.
///
/// Every setter is a no-op when the new state equals the current one, and
/// only real changes bump [`mutations`](Self::mutations). This is what lets
/// the render pass be idempotent without tracking a shadow copy.
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    content: String,
    selection: Option<Range<usize>>,
    mutations: u64,
}

impl Element {
    /// Creates an empty element with the given tag name (lowercased).
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Builder: sets initial content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Builder: sets an initial attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder: sets an initial style property.
    pub fn with_style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(name.into(), value.into());
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns true for style/script-like nodes that hold no visual content.
    pub fn is_auxiliary(&self) -> bool {
        AUXILIARY_TAGS.contains(&self.tag.as_str())
    }

    /// The raw content: plain text, or structured markup for rich text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replaces the content. Returns true if it changed.
    ///
    /// An existing selection is clamped to the new length rather than reset,
    /// so the cursor survives a live re-render.
    pub fn set_content(&mut self, content: &str) -> bool {
        if self.content == content {
            return false;
        }
        self.content = content.to_string();
        if let Some(sel) = self.selection.take() {
            let len = self.content.chars().count();
            self.selection = Some(sel.start.min(len)..sel.end.min(len));
        }
        self.mutations += 1;
        true
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Sets or removes an attribute. Returns true if it changed.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> bool {
        let changed = match value {
            Some(v) => {
                if self.attribute(name) == Some(v) {
                    false
                } else {
                    self.attributes.insert(name.to_string(), v.to_string());
                    true
                }
            }
            None => self.attributes.remove(name).is_some(),
        };
        if changed {
            self.mutations += 1;
        }
        changed
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles.get(name).map(String::as_str)
    }

    /// Sets or removes an inline style property. Returns true if it changed.
    pub fn set_style(&mut self, name: &str, value: Option<&str>) -> bool {
        let changed = match value {
            Some(v) => {
                if self.style(name) == Some(v) {
                    false
                } else {
                    self.styles.insert(name.to_string(), v.to_string());
                    true
                }
            }
            None => self.styles.remove(name).is_some(),
        };
        if changed {
            self.mutations += 1;
        }
        changed
    }

    /// Current selection as a char range over the visible text.
    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// Places the selection. Selection changes are not content mutations.
    pub fn select(&mut self, range: Range<usize>) {
        self.selection = Some(range.start.min(range.end)..range.end.max(range.start));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Number of selected chars, zero for a collapsed or absent selection.
    pub fn selection_len(&self) -> usize {
        self.selection.as_ref().map_or(0, |s| s.end - s.start)
    }

    /// Number of real changes applied to this element so far.
    pub fn mutations(&self) -> u64 {
        self.mutations
    }
}

// ============================================================================
// Handles
// ============================================================================

/// Owning handle to a host element.
#[derive(Debug, Clone)]
pub struct NodeHandle(Rc<RefCell<Element>>);

impl NodeHandle {
    pub fn new(element: Element) -> Self {
        Self(Rc::new(RefCell::new(element)))
    }

    pub fn borrow(&self) -> Ref<'_, Element> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Element> {
        self.0.borrow_mut()
    }

    /// Non-owning reference for components.
    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &NodeHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Element> for NodeHandle {
    fn from(element: Element) -> Self {
        Self::new(element)
    }
}

/// Non-owning reference to a host element.
#[derive(Debug, Clone, Default)]
pub struct WeakNode(Weak<RefCell<Element>>);

impl WeakNode {
    /// Returns the element if the host still holds it.
    pub fn upgrade(&self) -> Option<NodeHandle> {
        self.0.upgrade().map(NodeHandle)
    }

    /// Returns true if this refers to the same element as `node`.
    pub fn points_to(&self, node: &NodeHandle) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&node.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_only_count_real_changes() {
        let mut el = Element::new("DIV");
        assert_eq!(el.tag(), "div");

        assert!(el.set_content("hi"));
        assert!(!el.set_content("hi"));
        assert!(el.set_attribute("contenteditable", Some("true")));
        assert!(!el.set_attribute("contenteditable", Some("true")));
        assert!(!el.set_attribute("missing", None));
        assert!(el.set_style("color", Some("#000000")));
        assert!(el.set_style("color", None));

        assert_eq!(el.mutations(), 4);
    }

    #[test]
    fn content_change_clamps_selection() {
        let mut el = Element::new("p").with_content("Hello world");
        el.select(6..11);
        el.set_content("Hello");
        assert_eq!(el.selection(), Some(5..5));
        assert_eq!(el.selection_len(), 0);
    }

    #[test]
    fn auxiliary_tags_are_detected() {
        assert!(Element::new("style").is_auxiliary());
        assert!(Element::new("Script").is_auxiliary());
        assert!(!Element::new("span").is_auxiliary());
    }

    #[test]
    fn weak_node_observes_host_drop() {
        let node = NodeHandle::new(Element::new("img"));
        let weak = node.downgrade();
        assert!(weak.points_to(&node));
        assert!(weak.upgrade().is_some());
        drop(node);
        assert!(weak.upgrade().is_none());
    }
}
