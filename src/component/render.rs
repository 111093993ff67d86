//! Projection of component state onto the adopted node.
//!
//! Each family computes what the node should look like and hands it to the
//! helpers here, which only touch the node where it differs. Rewriting
//! identical content would reset the host's caret, so the no-op matters.

use crate::node::Element;

use super::Core;

/// Attributes and text every editable text-like node carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextProjection {
    pub content: String,
    pub placeholder: Option<String>,
    pub editable: bool,
}

impl TextProjection {
    /// Writes the projection. Returns true if the node changed.
    pub(crate) fn apply(&self, el: &mut Element) -> bool {
        let mut changed = el.set_content(&self.content);
        let editable = if self.editable { "true" } else { "false" };
        changed |= el.set_attribute("contenteditable", Some(editable));
        changed |= el.set_attribute("data-placeholder", self.placeholder.as_deref());
        changed
    }
}

/// The placeholder to show, if any: only for an empty value outside preview.
pub(crate) fn placeholder_for(core: &Core, empty: bool) -> Option<String> {
    let options = core.state.options();
    if !empty || options.preview {
        return None;
    }
    options.placeholder.clone().filter(|p| !p.is_empty())
}

/// State attributes shared by every family. Preview (export) mode strips
/// all of them so the node renders in its final, non-editable form.
pub(crate) fn paint_affordances(core: &Core, el: &mut Element) -> bool {
    let options = core.state.options();
    let edit_mode = !options.preview;
    let flag = |on: bool| if on && edit_mode { Some("") } else { None };

    let mut changed = el.set_attribute("data-highlight", flag(options.highlight));
    changed |= el.set_attribute("aria-disabled", flag(options.disabled).map(|_| "true"));
    changed |= el.set_attribute("aria-readonly", flag(options.read_only).map(|_| "true"));
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_projection_is_idempotent() {
        let projection = TextProjection {
            content: "Hello".into(),
            placeholder: None,
            editable: true,
        };
        let mut el = Element::new("p");
        assert!(projection.apply(&mut el));
        let after_first = el.mutations();
        assert!(!projection.apply(&mut el));
        assert_eq!(el.mutations(), after_first);
        assert_eq!(el.attribute("contenteditable"), Some("true"));
    }

    #[test]
    fn placeholder_attribute_toggles() {
        let mut el = Element::new("p");
        let empty = TextProjection {
            content: String::new(),
            placeholder: Some("Type here".into()),
            editable: true,
        };
        empty.apply(&mut el);
        assert_eq!(el.attribute("data-placeholder"), Some("Type here"));

        let filled = TextProjection {
            content: "x".into(),
            placeholder: None,
            editable: true,
        };
        filled.apply(&mut el);
        assert!(!el.has_attribute("data-placeholder"));
    }
}
