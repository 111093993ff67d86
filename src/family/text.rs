//! Editable text regions, with an optional rich-text toolbar.
//!
//! In plain mode the value is the node's text. In toolbar mode the value is
//! markup produced from a [`SpanList`], and formatting commands run against
//! the node's selection.

use crate::component::render::{TextProjection, paint_affordances, placeholder_for};
use crate::component::{ConfigStore, Core, Editable, Family};
use crate::config::EditorContext;
use crate::error::EditableError;
use crate::event::EditableEvent;
use crate::node::Element;
use crate::options::{EditableOptions, Setting};
use crate::richtext::{Command, FontState, SpanList};

/// Text behavior: plain content, or span markup in toolbar mode.
#[derive(Debug, Default)]
pub struct TextFamily;

impl Family for TextFamily {
    const NAME: &'static str = "text";
    const COUNTS_CHARS: bool = true;

    fn new(_ctx: &EditorContext, _options: &EditableOptions) -> Self {
        Self
    }

    fn accepts(&self, el: &Element) -> bool {
        !el.is_auxiliary()
    }

    fn requires_single(&self, state: &ConfigStore) -> bool {
        state.toolbar()
    }

    fn seed_from(&self, el: &Element, _state: &ConfigStore) -> Option<String> {
        let content = el.content();
        (!content.trim().is_empty()).then(|| content.to_string())
    }

    fn normalize(&self, state: &ConfigStore, value: String) -> (String, bool) {
        if state.toolbar() {
            (value, false)
        } else {
            state.clamp(value)
        }
    }

    fn read_back(&self, el: &Element, _state: &ConfigStore) -> String {
        el.content().to_string()
    }

    fn length(&self, state: &ConfigStore) -> usize {
        if state.toolbar() {
            SpanList::parse(state.value()).char_len()
        } else {
            state.value().chars().count()
        }
    }

    fn paint(&mut self, core: &Core, el: &mut Element) {
        let empty = self.length(core.state()) == 0;
        TextProjection {
            content: core.state().value().to_string(),
            placeholder: placeholder_for(core, empty),
            editable: core.is_interactive(),
        }
        .apply(el);
        paint_affordances(core, el);
        let toolbar = core.state().toolbar() && !core.state().options().preview;
        el.set_attribute("data-toolbar", toolbar.then_some(""));
    }

    fn convert(&self, state: &ConfigStore, setting: &Setting) -> Option<String> {
        let value = state.value();
        match setting {
            Setting::Toolbar(true) => Some(SpanList::from_plain(value).serialize()),
            Setting::Toolbar(false) => Some(SpanList::parse(value).plain_text()),
            _ => None,
        }
    }
}

impl Editable<TextFamily> {
    /// Runs a toolbar command over the node's selection.
    ///
    /// Returns true if the value changed. Requires toolbar mode, an
    /// interactive instance, and a non-empty selection.
    pub fn execute(&mut self, command: Command) -> bool {
        if !self.core.state().toolbar() || !self.core.is_interactive() {
            return false;
        }
        let Some(node) = self.live_node() else {
            return false;
        };
        let Some(range) = node.borrow().selection().filter(|r| !r.is_empty()) else {
            return false;
        };

        let command = match command {
            Command::SetFont(Some(id)) => match self.load_font(&id) {
                Some(family) => Command::SetFont(Some(family)),
                None => return false,
            },
            other => other,
        };

        let markup = SpanList::parse(self.value()).apply(range.clone(), &command).serialize();
        if markup == self.value() {
            return false;
        }
        if !self.focus_in() {
            return false;
        }
        self.set_value_ready(markup);
        node.borrow_mut().select(range);

        let value = self.value().to_string();
        self.core.emit(EditableEvent::Input { value });
        true
    }

    /// Looks up a catalog font and requests it. Returns the CSS family name,
    /// or `None` after emitting `font-load-error`.
    fn load_font(&mut self, id: &str) -> Option<String> {
        let ctx = self.core.context().clone();
        let Some(face) = ctx.config.font(id) else {
            self.font_failed(id, "font is not in the catalog".to_string());
            return None;
        };
        match ctx.fonts.ensure(face, ctx.font_loader.as_ref()) {
            FontState::Failed(reason) => {
                self.font_failed(&face.family, reason);
                None
            }
            FontState::Loading | FontState::Loaded => Some(face.family.clone()),
        }
    }

    /// Reports a finished font load.
    ///
    /// A failure reverts every span still using `family` and emits
    /// `font-load-error`. A failure for a font no longer in use is ignored.
    pub fn font_load_finished(&mut self, family: &str, result: Result<(), String>) {
        self.core.context().fonts.finish(family, result.clone());
        let Err(reason) = result else {
            return;
        };
        let Some(reverted) = SpanList::parse(self.value()).without_font(family) else {
            tracing::debug!(id = ?self.id(), family, "font failure superseded");
            return;
        };
        self.set_value_ready(reverted.serialize());
        self.font_failed(family, reason);
    }

    fn font_failed(&mut self, family: &str, reason: String) {
        let error = EditableError::AssetLoad {
            name: family.to_string(),
            reason: reason.clone(),
        };
        tracing::warn!(id = ?self.id(), %error, "font unavailable");
        self.core.emit(EditableEvent::FontLoadError {
            font_name: family.to_string(),
            error: reason,
        });
    }
}
