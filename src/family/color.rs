//! Background-color changers.
//!
//! The value is a CSS color applied as the node's `background-color`. After
//! every paint the legible foreground is recomputed and, when the instance
//! has an id, published to the shared [`ContrastRegistry`] so that other
//! components can follow it.

use palette::Srgb;

use crate::component::render::paint_affordances;
use crate::component::{ConfigStore, Core, Editable, Family};
use crate::config::EditorContext;
use crate::contrast::{ContrastRegistry, contrast_for_css, to_hex};
use crate::event::EditableEvent;
use crate::node::Element;
use crate::options::{EditableOptions, Setting};

/// Background-color behavior, with contrast published for other components.
#[derive(Debug)]
pub struct ColorFamily {
    registry: ContrastRegistry,
    published: Option<String>,
    contrast: Option<Srgb<u8>>,
}

impl ColorFamily {
    fn withdraw(&mut self) {
        if let Some(id) = self.published.take() {
            self.registry.withdraw(&id);
        }
    }

    fn publish(&mut self, id: Option<&str>, color: Srgb<u8>) {
        if self.published.as_deref() != id {
            self.withdraw();
        }
        if let Some(id) = id {
            self.registry.publish(id, color);
            self.published = Some(id.to_string());
        }
    }
}

impl Family for ColorFamily {
    const NAME: &'static str = "color";

    fn new(ctx: &EditorContext, _options: &EditableOptions) -> Self {
        Self {
            registry: ctx.contrast.clone(),
            published: None,
            contrast: None,
        }
    }

    fn accepts(&self, el: &Element) -> bool {
        !el.is_auxiliary()
    }

    fn seed_from(&self, el: &Element, _state: &ConfigStore) -> Option<String> {
        el.style("background-color").map(str::to_string)
    }

    fn normalize(&self, _state: &ConfigStore, value: String) -> (String, bool) {
        (value.trim().to_string(), false)
    }

    fn paint(&mut self, core: &Core, el: &mut Element) {
        let value = core.state().value();
        el.set_style("background-color", (!value.is_empty()).then_some(value));
        el.set_attribute("data-auto-color", core.state().options().auto_color.then_some(""));
        paint_affordances(core, el);
    }

    fn after_paint(&mut self, core: &mut Core, el: &mut Element) {
        let state = core.state();
        match contrast_for_css(state.value()) {
            Some(color) => {
                self.contrast = Some(color);
                el.set_style("--contrast-color", Some(&to_hex(color)));
                self.publish(state.id(), color);
            }
            None => {
                tracing::debug!(id = ?state.id(), background = state.value(), "contrast skipped");
            }
        }

        let options = state.options();
        if options.auto_color {
            let source = options.contrast_from.as_deref().or(options.id.as_deref());
            if let Some(hex) = source.and_then(|id| self.registry.get_hex(id)) {
                el.set_style("color", Some(&hex));
            }
        }
    }

    fn configure(&mut self, _core: &mut Core, setting: &Setting) {
        if let Setting::Id(_) = setting {
            self.withdraw();
        }
    }

    fn detached(&mut self, _core: &mut Core) {
        self.withdraw();
    }
}

impl Drop for ColorFamily {
    fn drop(&mut self) {
        self.withdraw();
    }
}

impl Editable<ColorFamily> {
    /// A color chosen in the picker. Disabled for `autoColor` instances.
    ///
    /// Returns false if the pick was ignored.
    pub fn pick(&mut self, color: &str) -> bool {
        if self.options().auto_color || !self.is_interactive() {
            return false;
        }
        let before = self.value().to_string();
        self.set_value_ready(color.to_string());

        let value = self.value().to_string();
        self.core.emit(EditableEvent::Input { value: value.clone() });
        if value != before {
            self.core.emit(EditableEvent::Change { value });
        }
        true
    }

    /// The last computed foreground, as uppercase hex.
    pub fn contrast_color(&self) -> Option<String> {
        self.family.contrast.map(to_hex)
    }

    /// Repaints so an `autoColor` instance picks up the latest published
    /// contrast of the instance it follows.
    pub fn sync_contrast(&mut self) {
        self.render();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::family::ColorChanger;
    use crate::node::NodeHandle;

    fn attached(ctx: &EditorContext, options: EditableOptions) -> (ColorChanger, NodeHandle) {
        let node = NodeHandle::new(Element::new("section"));
        let mut changer = ColorChanger::new(ctx, options);
        changer.attach(std::slice::from_ref(&node));
        changer.drain_events();
        (changer, node)
    }

    #[test]
    fn scenario_dark_background_publishes_white() {
        let ctx = EditorContext::default();
        let options = EditableOptions::new().with_id("c1").with_value("rgb(20,20,20)");
        let (changer, node) = attached(&ctx, options);

        assert_eq!(ctx.contrast.get_hex("c1").as_deref(), Some("#FFFFFF"));
        assert_eq!(changer.contrast_color().as_deref(), Some("#FFFFFF"));
        assert_eq!(node.borrow().style("background-color"), Some("rgb(20,20,20)"));
        assert_eq!(node.borrow().style("--contrast-color"), Some("#FFFFFF"));
    }

    #[test]
    fn threshold_is_inclusive() {
        let ctx = EditorContext::default();
        let options = EditableOptions::new().with_value("rgb(128, 128, 128)");
        let (mut changer, _node) = attached(&ctx, options);
        assert_eq!(changer.contrast_color().as_deref(), Some("#000000"));

        changer.set_value("rgb(127, 127, 127)");
        assert_eq!(changer.contrast_color().as_deref(), Some("#FFFFFF"));
    }

    #[test]
    fn transparent_keeps_previous_contrast() {
        let ctx = EditorContext::default();
        let options = EditableOptions::new().with_id("c2").with_value("#ffffff");
        let (mut changer, node) = attached(&ctx, options);

        changer.set_value("transparent");
        assert_eq!(changer.contrast_color().as_deref(), Some("#000000"));
        assert_eq!(ctx.contrast.get_hex("c2").as_deref(), Some("#000000"));
        assert_eq!(node.borrow().style("--contrast-color"), Some("#000000"));
        assert!(changer.events().is_empty());
    }

    #[test]
    fn id_change_moves_published_record() {
        let ctx = EditorContext::default();
        let options = EditableOptions::new().with_id("old").with_value("navy");
        let (mut changer, _node) = attached(&ctx, options);
        assert!(ctx.contrast.get("old").is_some());

        changer.set(Setting::Id(Some("new".into())));
        assert!(ctx.contrast.get("old").is_none());
        assert_eq!(ctx.contrast.get_hex("new").as_deref(), Some("#FFFFFF"));

        changer.detach();
        assert!(ctx.contrast.is_empty());
    }

    #[test]
    fn auto_color_follows_published_contrast() {
        let ctx = EditorContext::default();
        let options = EditableOptions::new().with_id("bg").with_value("#101010");
        let (mut source, _a) = attached(&ctx, options);

        let mut options = EditableOptions::new().with_auto_color(true);
        options.contrast_from = Some("bg".into());
        let (mut follower, node) = attached(&ctx, options);
        assert_eq!(node.borrow().style("color"), Some("#FFFFFF"));
        assert!(!follower.pick("red"));

        source.set_value("#fafafa");
        follower.sync_contrast();
        assert_eq!(node.borrow().style("color"), Some("#000000"));
    }

    #[test]
    fn pick_emits_input_then_change() {
        let ctx = EditorContext::default();
        let (mut changer, node) = attached(&ctx, EditableOptions::new().with_value("white"));

        assert!(changer.pick("black"));
        assert!(changer.pick("black"));
        let names: Vec<_> = changer.drain_events().iter().map(EditableEvent::name).collect();
        assert_eq!(names, ["input", "change", "input"]);
        assert_eq!(node.borrow().style("background-color"), Some("black"));
        assert_eq!(node.borrow().style("--contrast-color"), Some("#FFFFFF"));
    }

    #[test]
    fn adopts_existing_background() {
        let ctx = EditorContext::default();
        let node = NodeHandle::new(Element::new("div").with_style("background-color", "#336699"));
        let mut changer = ColorChanger::new(&ctx, EditableOptions::new());
        changer.attach(std::slice::from_ref(&node));
        assert_eq!(changer.value(), "#336699");
    }

    #[test]
    fn drop_withdraws_record() {
        let ctx = EditorContext::default();
        let options = EditableOptions::new().with_id("gone").with_value("red");
        let (changer, _node) = attached(&ctx, options);
        assert_eq!(ctx.contrast.len(), 1);
        drop(changer);
        assert!(ctx.contrast.is_empty());
    }
}
