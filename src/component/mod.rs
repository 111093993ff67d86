//! Shared framework behind every editable component.
//!
//! An [`Editable<F>`] couples the generic machinery (configuration store,
//! lifecycle, persistence, content adoption, focus/commit handling, events)
//! with a [`Family`] that knows how one kind of component reads and paints
//! its node. The split mirrors how the families differ: only seeding,
//! normalization, and painting are family-specific.
//!
//! # Control Flow
//!
//! ```text
//! attach(children)
//!     │
//!     ▼
//! resolve node ──none──▶ slotted-element-missing, inert
//!     │
//!     ▼
//! seed value: persisted ▸ declared ▸ adopted content
//!     │
//!     ▼
//! replay buffered writes ─▶ first render ─▶ Ready
//!
//! set(Setting) ─▶ ConfigStore ─▶ persist ─▶ render ─▶ events
//! ```

mod content;
mod interaction;
mod lifecycle;
mod persistence;
pub(crate) mod render;
mod state;

pub use interaction::{FocusState, Key, KeyOutcome};
pub use lifecycle::Phase;
pub use state::{ConfigStore, Origin};

use std::time::Duration;

use crate::config::EditorContext;
use crate::error::EditableError;
use crate::event::{EditableEvent, EventQueue, LengthDetail};
use crate::node::{Element, NodeHandle, WeakNode};
use crate::options::{EditableOptions, Setting};

use content::ContentSlot;
use interaction::Interaction;
use lifecycle::Lifecycle;
use persistence::Persistence;

// ============================================================================
// Family Trait
// ============================================================================

/// Behavior specific to one component family.
///
/// Hooks receive the shared [`Core`] read-only unless they need to publish
/// derived state or persist auxiliary fields.
pub trait Family: Sized {
    /// Short name used in logs and errors.
    const NAME: &'static str;

    /// Whether accepted changes emit `char-count`.
    const COUNTS_CHARS: bool = false;

    fn new(ctx: &EditorContext, options: &EditableOptions) -> Self;

    /// Whether `el` may be adopted.
    fn accepts(&self, _el: &Element) -> bool {
        true
    }

    /// Whether adoption requires exactly one non-auxiliary child.
    fn requires_single(&self, _state: &ConfigStore) -> bool {
        false
    }

    /// Existing node content to adopt when nothing else seeds the value.
    fn seed_from(&self, el: &Element, state: &ConfigStore) -> Option<String>;

    /// Canonicalizes a value before it is stored. Returns the value and
    /// whether it had to be truncated.
    fn normalize(&self, state: &ConfigStore, value: String) -> (String, bool) {
        state.clamp(value)
    }

    /// Reads the value back from the node after user input.
    fn read_back(&self, _el: &Element, state: &ConfigStore) -> String {
        state.value().to_string()
    }

    /// Visible length of the current value.
    fn length(&self, state: &ConfigStore) -> usize {
        state.value().chars().count()
    }

    /// Called after the stored value changed.
    fn value_changed(&mut self, _core: &mut Core) {}

    /// Projects state onto the node.
    fn paint(&mut self, core: &Core, el: &mut Element);

    /// Runs after each paint while the node is still borrowed.
    fn after_paint(&mut self, _core: &mut Core, _el: &mut Element) {}

    /// The value a changed option implies, if it rewrites the current one.
    /// Must be free of side effects; it also runs while detached.
    fn convert(&self, _state: &ConfigStore, _setting: &Setting) -> Option<String> {
        None
    }

    /// Side effects of a changed option on a ready instance.
    fn configure(&mut self, _core: &mut Core, _setting: &Setting) {}

    /// Called once, right after the initial value is seeded.
    fn seeded(&mut self, _core: &mut Core, _node: Option<&Element>) {}

    /// Called on detach, before the node is released.
    fn detached(&mut self, _core: &mut Core) {}
}

// ============================================================================
// Core
// ============================================================================

/// The family-independent state of a component.
pub struct Core {
    pub(crate) ctx: EditorContext,
    pub(crate) state: ConfigStore,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) slot: ContentSlot,
    pub(crate) persistence: Persistence,
    pub(crate) interaction: Interaction,
    pub(crate) events: EventQueue,
}

impl Core {
    pub fn state(&self) -> &ConfigStore {
        &self.state
    }

    pub fn context(&self) -> &EditorContext {
        &self.ctx
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    /// Ready, holding a live node, and not disabled, read-only, or in preview.
    pub fn is_interactive(&self) -> bool {
        let options = self.state.options();
        self.lifecycle.is_ready()
            && self.slot.node().is_some()
            && !options.disabled
            && !options.read_only
            && !options.preview
    }

    /// Queues an event. Dropped unless the instance is ready.
    pub(crate) fn emit(&mut self, event: EditableEvent) {
        if self.lifecycle.is_ready() {
            self.events.push(event);
        }
    }

    pub(crate) fn length_detail(&self, value: &str, length: usize) -> LengthDetail {
        LengthDetail {
            value: value.to_string(),
            length,
            max_length: self.state.effective_max_length(),
        }
    }

    pub(crate) fn persist_value(&mut self) {
        let persist = self.state.options().persist;
        self.persistence.save(persist, self.state.value());
    }
}

// ============================================================================
// Editable
// ============================================================================

/// A stateful editing component managing one adopted host node.
pub struct Editable<F: Family> {
    pub(crate) core: Core,
    pub(crate) family: F,
}

impl<F: Family> Editable<F> {
    /// Creates a detached instance. Nothing renders or persists until
    /// [`attach`](Self::attach).
    pub fn new(ctx: &EditorContext, options: EditableOptions) -> Self {
        let family = F::new(ctx, &options);
        let mut persistence =
            Persistence::new(ctx.store.clone(), &ctx.config.namespace, &ctx.config.version);
        persistence.rekey(options.id.as_deref(), options.storage_key.as_deref());

        Self {
            core: Core {
                ctx: ctx.clone(),
                state: ConfigStore::new(options),
                lifecycle: Lifecycle::default(),
                slot: ContentSlot::default(),
                persistence,
                interaction: Interaction::new(ctx.config.blur_grace()),
                events: EventQueue::default(),
            },
            family,
        }
    }

    /// The current value, already normalized.
    pub fn value(&self) -> &str {
        self.core.state.value()
    }

    /// The declarative options as last written.
    pub fn options(&self) -> &EditableOptions {
        self.core.state.options()
    }

    pub fn state(&self) -> &ConfigStore {
        &self.core.state
    }

    /// The instance identifier, if one is configured.
    pub fn id(&self) -> Option<&str> {
        self.core.state.id()
    }

    /// Where the instance is in its attach/detach lifecycle.
    pub fn phase(&self) -> Phase {
        self.core.phase()
    }

    /// Whether the instance accepts focus and input.
    pub fn is_interactive(&self) -> bool {
        self.core.is_interactive()
    }

    /// Whether an edit is in progress.
    pub fn focus_state(&self) -> FocusState {
        self.core.interaction.state()
    }

    /// True while a blur is waiting out its grace period.
    pub fn commit_pending(&self) -> bool {
        self.core.interaction.blur_pending()
    }

    /// The persistence key, if the instance has one.
    pub fn storage_key(&self) -> Option<&str> {
        self.core.persistence.key()
    }

    /// The adopted node, if the host still holds it.
    pub fn node(&self) -> Option<NodeHandle> {
        self.core.slot.node()
    }

    /// Events emitted since the last drain.
    pub fn events(&self) -> &[EditableEvent] {
        self.core.events.peek()
    }

    pub fn drain_events(&mut self) -> Vec<EditableEvent> {
        self.core.events.drain()
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Adopts content from `children` and becomes ready.
    ///
    /// Calling this on a ready instance only re-resolves content.
    pub fn attach(&mut self, children: &[NodeHandle]) {
        match self.core.lifecycle.phase() {
            Phase::Ready => self.sync_content(children),
            Phase::Attaching => {
                self.core.lifecycle.take_deferred();
                self.finish_attach(children);
            }
            Phase::Uninitialized | Phase::Detached => {
                self.core.lifecycle.begin_attach();
                self.finish_attach(children);
            }
        }
    }

    /// Starts attaching but resolves content on the next [`tick`](Self::tick),
    /// giving the host a turn to finish inserting it.
    pub fn attach_deferred(&mut self, children: &[NodeHandle]) {
        if self.core.lifecycle.begin_attach() {
            tracing::debug!(family = F::NAME, id = ?self.id(), "attach deferred");
            self.core
                .lifecycle
                .defer(children.iter().map(NodeHandle::downgrade).collect());
        }
    }

    /// Runs due work: a deferred attach and an elapsed blur grace period.
    pub fn tick(&mut self, now: Duration) {
        if self.core.lifecycle.phase() == Phase::Attaching {
            if let Some(deferred) = self.core.lifecycle.take_deferred() {
                let children: Vec<NodeHandle> =
                    deferred.iter().filter_map(WeakNode::upgrade).collect();
                self.finish_attach(&children);
            }
        }
        if self.core.interaction.blur_due(now) {
            self.commit();
        }
    }

    /// Re-resolves content after the host changed its children.
    ///
    /// Losing the adopted node with no replacement disables the instance and
    /// emits `slotted-element-missing` once.
    pub fn sync_content(&mut self, children: &[NodeHandle]) {
        match self.core.lifecycle.phase() {
            Phase::Ready => {}
            Phase::Attaching if self.core.lifecycle.has_deferred() => {
                self.core
                    .lifecycle
                    .defer(children.iter().map(NodeHandle::downgrade).collect());
                return;
            }
            _ => return,
        }

        self.core.slot.observe(children);
        if let Some(current) = self.core.slot.node() {
            if children.iter().any(|c| c.ptr_eq(&current)) {
                return;
            }
        }
        self.readopt(children);
    }

    /// Resolves `children` again and adopts, keeps, or drops the node.
    fn readopt(&mut self, children: &[NodeHandle]) {
        match self.resolve(children) {
            Some(node) if !self.core.slot.is_adopted(&node) => {
                tracing::debug!(family = F::NAME, id = ?self.id(), "adopted replacement node");
                self.core.interaction.reset();
                self.core.slot.adopt(&node);
                self.render();
            }
            Some(_) => {}
            None => {
                self.core.slot.release();
                self.report_missing();
            }
        }
    }

    /// Unwires the instance from its node. Configuration and value are kept,
    /// so a later [`attach`](Self::attach) is cheap.
    pub fn detach(&mut self) {
        match self.core.lifecycle.phase() {
            Phase::Uninitialized | Phase::Detached => return,
            Phase::Attaching => {
                self.core.lifecycle.mark_detached();
                return;
            }
            Phase::Ready => {}
        }
        self.core.interaction.reset();
        self.family.detached(&mut self.core);
        self.core.persistence.release();
        self.core.slot.release();
        self.core.lifecycle.mark_detached();
        tracing::debug!(family = F::NAME, id = ?self.id(), "detached");
    }

    fn finish_attach(&mut self, children: &[NodeHandle]) {
        self.core.slot.observe(children);
        let resolved = self.resolve(children);
        self.core.lifecycle.mark_ready();
        tracing::debug!(
            family = F::NAME,
            id = ?self.id(),
            adopted = resolved.is_some(),
            "attached"
        );

        match &resolved {
            Some(node) => self.core.slot.adopt(node),
            None => self.report_missing(),
        }

        if !self.core.lifecycle.is_seeded() {
            self.seed(resolved.as_ref());
            self.core.lifecycle.mark_seeded();
            let el = resolved.as_ref().map(|n| n.borrow().clone());
            self.family.seeded(&mut self.core, el.as_ref());
        }

        for setting in self.core.lifecycle.take_pending() {
            self.apply_ready(setting);
        }
        self.render();
    }

    fn resolve(&self, children: &[NodeHandle]) -> Option<NodeHandle> {
        let single = self.family.requires_single(&self.core.state);
        content::resolve(children, single, |el| self.family.accepts(el))
    }

    /// Persisted value, then declared value, then adopted content.
    fn seed(&mut self, node: Option<&NodeHandle>) {
        let persist = self.core.state.options().persist;
        let persisted = self.core.persistence.load(persist);
        let declared = self.core.state.options().value.clone();
        let adopted = node.and_then(|n| self.family.seed_from(&n.borrow(), &self.core.state));

        let seed = persisted.or(declared).or(adopted).unwrap_or_default();
        let (value, _) = self.family.normalize(&self.core.state, seed);
        self.core.state.set_value(value);
        self.family.value_changed(&mut self.core);
    }

    fn report_missing(&mut self) {
        self.core.interaction.reset();
        if self.core.slot.report_missing() {
            tracing::warn!(
                family = F::NAME,
                id = ?self.id(),
                error = %EditableError::ContentResolution { family: F::NAME },
                "component disabled"
            );
            self.core.emit(EditableEvent::SlottedElementMissing);
        }
    }

    /// The adopted node, noticing if the host dropped it.
    pub(crate) fn live_node(&mut self) -> Option<NodeHandle> {
        if let Some(node) = self.core.slot.node() {
            return Some(node);
        }
        if self.core.slot.is_bound() {
            self.core.slot.release();
            self.report_missing();
        }
        None
    }

    pub(crate) fn render(&mut self) {
        if !self.core.lifecycle.is_ready() {
            return;
        }
        let Some(node) = self.live_node() else {
            return;
        };
        let mut el = node.borrow_mut();
        self.family.paint(&self.core, &mut el);
        self.core.state.mark_rendered();
        self.family.after_paint(&mut self.core, &mut el);
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    /// Applies one option write through the single configuration path.
    pub fn set(&mut self, setting: Setting) {
        self.apply(setting, Origin::Property);
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.set(Setting::Value(value.into()));
    }

    /// Applies a string attribute write. Produces the same end state as the
    /// equivalent [`set`](Self::set).
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> Result<(), EditableError> {
        let setting = Setting::from_attribute(name, value).inspect_err(|error| {
            tracing::warn!(family = F::NAME, id = ?self.id(), %error, "attribute ignored");
        })?;
        self.apply(setting, Origin::Attribute);
        Ok(())
    }

    /// Reads an option back in attribute form. Boolean options reflect as
    /// `Some("")` when on and `None` when off.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let canonical = Setting::from_attribute(name, None).ok()?.attribute_name();
        let o = self.core.state.options();
        let flag = |on: bool| on.then(String::new);
        match canonical {
            "value" => Some(self.core.state.value().to_string()),
            "placeholder" => o.placeholder.clone(),
            "maxlength" => o.max_length.map(|n| n.to_string()),
            "readonly" => flag(o.read_only),
            "disabled" => flag(o.disabled),
            "preview" => flag(o.preview),
            "highlight" => flag(o.highlight),
            "persist" => flag(o.persist),
            "toolbar" => flag(o.toolbar),
            "auto-color" => flag(o.auto_color),
            "id" => o.id.clone(),
            "storage-key" => o.storage_key.clone(),
            "alt" => o.alt.clone(),
            "fallback-src" => o.fallback_src.clone(),
            "secondary-fallback-src" => o.secondary_fallback_src.clone(),
            "contrast-from" => o.contrast_from.clone(),
            _ => None,
        }
    }

    fn apply(&mut self, setting: Setting, origin: Origin) {
        if !self.core.state.begin_sync(origin) {
            tracing::trace!(family = F::NAME, ?origin, "nested write ignored");
            return;
        }
        match self.core.lifecycle.phase() {
            Phase::Ready => self.apply_ready(setting),
            Phase::Uninitialized | Phase::Attaching => match setting {
                Setting::Value(_) => self.core.lifecycle.buffer(setting),
                other => {
                    self.store_option(&other);
                }
            },
            Phase::Detached => match setting {
                Setting::Value(v) => self.store_detached(v),
                other => {
                    if self.store_option(&other) {
                        if let Some(value) = self.implied_value(&other) {
                            self.store_detached(value);
                        }
                    }
                }
            },
        }
        self.core.state.end_sync();
    }

    /// Records an option without side effects. Returns true if it changed.
    fn store_option(&mut self, setting: &Setting) -> bool {
        let changed = self.core.state.options_mut().apply(setting);
        if matches!(setting, Setting::Id(_) | Setting::StorageKey(_)) {
            self.rekey();
        }
        changed
    }

    /// Normalizes and stores a value without persisting, rendering, or
    /// emitting. The next attach paints it.
    fn store_detached(&mut self, value: String) {
        let (value, _) = self.family.normalize(&self.core.state, value);
        if value != self.core.state.value() {
            self.core.state.set_value(value);
            self.family.value_changed(&mut self.core);
        }
    }

    /// The value an already-applied option change implies.
    fn implied_value(&self, setting: &Setting) -> Option<String> {
        self.family.convert(&self.core.state, setting).or_else(|| {
            matches!(setting, Setting::MaxLength(_)).then(|| self.core.state.value().to_string())
        })
    }

    fn rekey(&mut self) {
        let options = self.core.state.options();
        let (id, key) = (options.id.clone(), options.storage_key.clone());
        self.core.persistence.rekey(id.as_deref(), key.as_deref());
    }

    fn apply_ready(&mut self, setting: Setting) {
        if let Setting::Value(value) = setting {
            self.set_value_ready(value);
            return;
        }
        if !self.core.state.options_mut().apply(&setting) {
            return;
        }

        match &setting {
            Setting::Persist(true) => self.core.persist_value(),
            Setting::Persist(false) => self.core.persistence.clear(),
            Setting::Id(_) | Setting::StorageKey(_) => {
                self.rekey();
                self.core.persist_value();
            }
            Setting::ReadOnly(_) | Setting::Disabled(_) | Setting::Preview(_) => {
                if !self.core.is_interactive() {
                    self.core.interaction.reset();
                }
            }
            Setting::Toolbar(true) if self.family.requires_single(&self.core.state) => {
                let children = self.core.slot.children();
                self.readopt(&children);
            }
            _ => {}
        }

        self.family.configure(&mut self.core, &setting);
        if let Some(value) = self.implied_value(&setting) {
            self.set_value_ready(value);
        }
        self.render();
    }

    /// The set-value path for a ready instance.
    pub(crate) fn set_value_ready(&mut self, value: String) {
        let attempted = value.chars().count();
        let (value, truncated) = self.family.normalize(&self.core.state, value);
        if truncated {
            let detail = self.core.length_detail(&value, attempted);
            self.core.emit(EditableEvent::MaxLength(detail));
        }
        self.store_value(value);
    }

    /// Stores an already-normalized value, then persists, renders, and
    /// reports the new length.
    fn store_value(&mut self, value: String) {
        if value == self.core.state.value() {
            if !self.core.state.has_rendered() {
                self.render();
            }
            return;
        }
        self.core.state.set_value(value);
        self.family.value_changed(&mut self.core);
        self.core.persist_value();
        self.render();

        if !F::COUNTS_CHARS {
            return;
        }
        let length = self.family.length(&self.core.state);
        let detail = self.core.length_detail(self.core.state.value(), length);
        self.core.emit(EditableEvent::CharCount(detail));
    }

    // ------------------------------------------------------------------------
    // Interaction
    // ------------------------------------------------------------------------

    /// Focus entered the component. Returns false if it is not interactive.
    pub fn focus_in(&mut self) -> bool {
        if !self.core.is_interactive() {
            return false;
        }
        let value = self.core.state.value().to_string();
        self.core.interaction.focus_in(&value);
        true
    }

    /// Focus left the component at `now`; commits after the grace period
    /// unless focus returns first.
    pub fn focus_out(&mut self, now: Duration) {
        self.core.interaction.schedule_blur(now);
    }

    /// Commits immediately.
    pub fn blur(&mut self) {
        self.commit();
    }

    /// The host changed the node's content through user input.
    pub fn on_input(&mut self) {
        if !self.core.is_interactive() {
            return;
        }
        let Some(node) = self.live_node() else {
            return;
        };
        if self.core.interaction.state() == FocusState::Idle {
            let value = self.core.state.value().to_string();
            self.core.interaction.focus_in(&value);
        }

        let raw = self.family.read_back(&node.borrow(), &self.core.state);
        let attempted = raw.chars().count();
        let (value, truncated) = self.family.normalize(&self.core.state, raw);
        if truncated {
            let detail = self.core.length_detail(&value, attempted);
            self.core.emit(EditableEvent::MaxLength(detail));
        }
        self.store_value(value);
        if truncated {
            // The node still shows the overflow when the stored value did not change.
            self.render();
        }

        let value = self.core.state.value().to_string();
        self.core.emit(EditableEvent::Input { value });
    }

    /// Handles a key press before the host applies it.
    pub fn key_down(&mut self, key: Key) -> KeyOutcome {
        if !self.core.is_interactive() {
            return KeyOutcome::Default;
        }
        match key {
            Key::Enter if !self.core.state.toolbar() => {
                self.commit();
                KeyOutcome::Prevented
            }
            Key::Escape => {
                if let Some(snapshot) = self.core.interaction.snapshot().map(str::to_string) {
                    self.set_value_ready(snapshot);
                }
                self.commit();
                KeyOutcome::Prevented
            }
            Key::Char(_) => {
                let Some(max) = self.core.state.effective_max_length() else {
                    return KeyOutcome::Default;
                };
                let length = self.family.length(&self.core.state);
                let selected = self.live_node().map_or(0, |n| n.borrow().selection_len());
                if length >= max && selected == 0 {
                    let detail = self.core.length_detail(self.core.state.value(), length + 1);
                    self.core.emit(EditableEvent::MaxLength(detail));
                    KeyOutcome::Prevented
                } else {
                    KeyOutcome::Default
                }
            }
            _ => KeyOutcome::Default,
        }
    }

    fn commit(&mut self) {
        let Some(snapshot) = self.core.interaction.begin_commit() else {
            return;
        };
        let value = self.core.state.value().to_string();
        if value != snapshot {
            tracing::debug!(family = F::NAME, id = ?self.id(), "committed change");
            self.core.emit(EditableEvent::Change { value });
        }
        self.core.interaction.finish_commit();
    }
}

// ============================================================================
// Configurable Trait
// ============================================================================

/// Types that can be configured from, and exported as, [`EditableOptions`].
pub trait Configurable {
    /// Applies every option through the normal configuration path.
    fn apply_options(&mut self, options: &EditableOptions);

    /// Exports the current configuration, with `value` set to the live value.
    fn export_options(&self) -> EditableOptions;
}

impl<F: Family> Configurable for Editable<F> {
    fn apply_options(&mut self, options: &EditableOptions) {
        for setting in options.settings() {
            self.set(setting);
        }
    }

    fn export_options(&self) -> EditableOptions {
        let mut options = self.core.state.options().clone();
        options.value = Some(self.core.state.value().to_string());
        options
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::EditorConfig;
    use crate::store::PersistedStore;

    /// Records hook calls; adopts only `div`s.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl Family for Recorder {
        const NAME: &'static str = "recorder";

        fn new(_ctx: &EditorContext, _options: &EditableOptions) -> Self {
            Self::default()
        }

        fn accepts(&self, el: &Element) -> bool {
            el.tag() == "div"
        }

        fn seed_from(&self, el: &Element, _state: &ConfigStore) -> Option<String> {
            el.attribute("data-seed").map(str::to_string)
        }

        fn value_changed(&mut self, _core: &mut Core) {
            self.calls.push("value");
        }

        fn paint(&mut self, core: &Core, el: &mut Element) {
            self.calls.push("paint");
            el.set_attribute("data-value", Some(core.state().value()));
        }

        fn seeded(&mut self, _core: &mut Core, _node: Option<&Element>) {
            self.calls.push("seeded");
        }

        fn detached(&mut self, _core: &mut Core) {
            self.calls.push("detached");
        }
    }

    fn div() -> NodeHandle {
        NodeHandle::new(Element::new("div").with_attribute("data-seed", "seed"))
    }

    #[test]
    fn hooks_run_in_lifecycle_order() {
        let ctx = EditorContext::default();
        let node = div();
        let mut recorder = Editable::<Recorder>::new(&ctx, EditableOptions::new());

        recorder.attach(std::slice::from_ref(&node));
        assert_eq!(recorder.value(), "seed");
        assert_eq!(node.borrow().attribute("data-value"), Some("seed"));

        recorder.detach();
        recorder.attach(std::slice::from_ref(&node));
        assert_eq!(recorder.family.calls, ["value", "seeded", "paint", "detached", "paint"]);
    }

    #[test]
    fn unaccepted_children_are_skipped() {
        let ctx = EditorContext::default();
        let span = NodeHandle::new(Element::new("span"));
        let node = div();
        let mut recorder = Editable::<Recorder>::new(&ctx, EditableOptions::new());

        recorder.attach(&[span, node.clone()]);
        assert!(recorder.node().is_some_and(|n| n.ptr_eq(&node)));
    }

    #[test]
    fn events_wait_for_ready() {
        let ctx = EditorContext::default();
        let mut recorder = Editable::<Recorder>::new(&ctx, EditableOptions::new());
        recorder.core.emit(EditableEvent::SlottedElementMissing);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn shared_key_has_one_writer() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let store = PersistedStore::in_memory();
        let ctx = EditorContext::with_store(EditorConfig::default(), store.clone());
        let options = EditableOptions::new().with_id("same").with_persist(true);
        let (a, b) = (div(), div());

        let mut first = Editable::<Recorder>::new(&ctx, options.clone());
        first.attach(std::slice::from_ref(&a));
        let mut second = Editable::<Recorder>::new(&ctx, options);
        second.attach(std::slice::from_ref(&b));

        first.set_value("from first");
        second.set_value("from second");
        assert_eq!(store.get("vellum-v1-same").unwrap().as_deref(), Some("from first"));

        first.detach();
        second.set_value("second takes over");
        assert_eq!(store.get("vellum-v1-same").unwrap().as_deref(), Some("from first"));
        drop(second);

        let options = EditableOptions::new().with_id("same").with_persist(true);
        let mut third = Editable::<Recorder>::new(&ctx, options);
        third.attach(std::slice::from_ref(&a));
        assert_eq!(third.value(), "from first");
        third.set_value("third");
        assert_eq!(store.get("vellum-v1-same").unwrap().as_deref(), Some("third"));
    }

    #[test]
    fn nested_writes_are_ignored() {
        let ctx = EditorContext::default();
        let node = div();
        let mut recorder = Editable::<Recorder>::new(&ctx, EditableOptions::new());
        recorder.attach(std::slice::from_ref(&node));

        assert!(recorder.core.state.begin_sync(Origin::Attribute));
        recorder.set_value("ignored");
        recorder.core.state.end_sync();
        assert_eq!(recorder.value(), "seed");
    }
}
