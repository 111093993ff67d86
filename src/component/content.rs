//! Discovery and tracking of the adopted host node.

use crate::node::{Element, NodeHandle, WeakNode};

/// Picks the node a component should manage from the host's children.
///
/// Auxiliary nodes are skipped. With `single`, exactly one non-auxiliary
/// child must exist and be accepted; otherwise the first accepted one wins.
pub(crate) fn resolve(
    children: &[NodeHandle],
    single: bool,
    accepts: impl Fn(&Element) -> bool,
) -> Option<NodeHandle> {
    let mut candidates = children.iter().filter(|c| !c.borrow().is_auxiliary());
    if single {
        let only = candidates.next()?;
        if candidates.next().is_some() || !accepts(&only.borrow()) {
            return None;
        }
        return Some(only.clone());
    }
    candidates.find(|c| accepts(&c.borrow())).cloned()
}

/// The component's reference to its adopted node.
#[derive(Debug, Default)]
pub(crate) struct ContentSlot {
    node: Option<WeakNode>,
    children: Vec<WeakNode>,
    missing_reported: bool,
}

impl ContentSlot {
    pub(crate) fn adopt(&mut self, node: &NodeHandle) {
        self.node = Some(node.downgrade());
        self.missing_reported = false;
    }

    /// Remembers the host children the node was resolved from.
    pub(crate) fn observe(&mut self, children: &[NodeHandle]) {
        self.children = children.iter().map(NodeHandle::downgrade).collect();
    }

    /// The last observed children the host still holds.
    pub(crate) fn children(&self) -> Vec<NodeHandle> {
        self.children.iter().filter_map(WeakNode::upgrade).collect()
    }

    pub(crate) fn release(&mut self) {
        self.node = None;
    }

    /// True if a node was adopted, whether or not the host still holds it.
    pub(crate) fn is_bound(&self) -> bool {
        self.node.is_some()
    }

    /// The adopted node, if the host still holds it.
    pub(crate) fn node(&self) -> Option<NodeHandle> {
        self.node.as_ref()?.upgrade()
    }

    pub(crate) fn is_adopted(&self, node: &NodeHandle) -> bool {
        self.node.as_ref().is_some_and(|w| w.points_to(node))
    }

    /// Marks the loss as reported. Returns false if it already was.
    pub(crate) fn report_missing(&mut self) -> bool {
        !std::mem::replace(&mut self.missing_reported, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(tags: &[&str]) -> Vec<NodeHandle> {
        tags.iter().map(|t| NodeHandle::new(Element::new(*t))).collect()
    }

    #[test]
    fn first_non_auxiliary_wins() {
        let children = nodes(&["style", "span", "p"]);
        let found = resolve(&children, false, |_| true).unwrap();
        assert!(found.ptr_eq(&children[1]));
    }

    #[test]
    fn single_mode_requires_exactly_one() {
        let one = nodes(&["script", "img"]);
        assert!(resolve(&one, true, |e| e.tag() == "img").is_some());

        let two = nodes(&["img", "img"]);
        assert!(resolve(&two, true, |e| e.tag() == "img").is_none());

        let wrong = nodes(&["div"]);
        assert!(resolve(&wrong, true, |e| e.tag() == "img").is_none());

        assert!(resolve(&[], true, |_| true).is_none());
    }

    #[test]
    fn slot_reports_missing_once_per_loss() {
        let node = NodeHandle::new(Element::new("p"));
        let mut slot = ContentSlot::default();
        slot.adopt(&node);
        assert!(slot.is_adopted(&node));

        drop(node);
        assert!(slot.node().is_none());
        assert!(slot.is_bound());
        assert!(slot.report_missing());
        assert!(!slot.report_missing());

        let replacement = NodeHandle::new(Element::new("p"));
        slot.adopt(&replacement);
        assert!(slot.report_missing());
    }

    #[test]
    fn observed_children_skip_dropped_nodes() {
        let mut children = nodes(&["p", "span"]);
        let mut slot = ContentSlot::default();
        slot.observe(&children);
        children.pop();

        let kept = slot.children();
        assert_eq!(kept.len(), 1);
        assert!(kept[0].ptr_eq(&children[0]));
    }
}
