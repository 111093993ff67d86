//! The single source of truth for one component: declared options plus the
//! live value.

use crate::options::EditableOptions;

/// Which surface started a synchronization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A typed setter such as [`Editable::set`](super::Editable::set).
    Property,
    /// The string attribute surface.
    Attribute,
}

/// Declared configuration and current value.
///
/// Read access is public; every write goes through the owning
/// [`Editable`](super::Editable) so that validation, persistence, rendering,
/// and events happen together.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    options: EditableOptions,
    value: String,
    rendered: bool,
    sync: Option<Origin>,
}

impl ConfigStore {
    pub(crate) fn new(options: EditableOptions) -> Self {
        let value = options.value.clone().unwrap_or_default();
        Self {
            options,
            value,
            rendered: false,
            sync: None,
        }
    }

    pub fn options(&self) -> &EditableOptions {
        &self.options
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn id(&self) -> Option<&str> {
        self.options.id.as_deref()
    }

    pub fn toolbar(&self) -> bool {
        self.options.toolbar
    }

    /// The max length that applies right now: none in toolbar mode.
    pub fn effective_max_length(&self) -> Option<usize> {
        if self.options.toolbar {
            None
        } else {
            self.options.max_length
        }
    }

    /// Truncates `value` to the effective max length.
    ///
    /// Returns the value and whether anything was cut.
    pub fn clamp(&self, value: String) -> (String, bool) {
        match self.effective_max_length() {
            Some(max) if value.chars().count() > max => (value.chars().take(max).collect(), true),
            _ => (value, false),
        }
    }

    /// True once the first render pass has run.
    pub fn has_rendered(&self) -> bool {
        self.rendered
    }

    pub(crate) fn options_mut(&mut self) -> &mut EditableOptions {
        &mut self.options
    }

    pub(crate) fn set_value(&mut self, value: String) {
        self.value = value;
    }

    pub(crate) fn mark_rendered(&mut self) {
        self.rendered = true;
    }

    /// Opens a synchronization pass. Returns false if one is already running,
    /// in which case the caller must not re-enter.
    pub(crate) fn begin_sync(&mut self, origin: Origin) -> bool {
        if self.sync.is_some() {
            return false;
        }
        self.sync = Some(origin);
        true
    }

    pub(crate) fn end_sync(&mut self) {
        self.sync = None;
    }
}
