//! On-demand font assets.
//!
//! Each font family is requested at most once per [`FontCache`]; the cache is
//! shared through the editor context so every text component sees the same
//! state. Loading is fire-and-forget: the host's [`FontLoader`] starts the
//! fetch and later reports the result back.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// A font the toolbar can apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFace {
    /// Catalog id used by the toolbar.
    pub id: String,
    /// CSS family name written into markup.
    pub family: String,
    /// Where the asset is fetched from.
    pub source: String,
}

impl FontFace {
    pub fn new(
        id: impl Into<String>,
        family: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            family: family.into(),
            source: source.into(),
        }
    }
}

/// Starts fetching a font asset. Must not block.
pub trait FontLoader {
    fn request(&self, font: &FontFace);
}

/// Loader that fetches nothing; fonts stay `Loading` until reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFontLoader;

impl FontLoader for NoopFontLoader {
    fn request(&self, _font: &FontFace) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontState {
    Loading,
    Loaded,
    Failed(String),
}

/// Shared memo of font load states, keyed by family name.
#[derive(Debug, Clone, Default)]
pub struct FontCache {
    states: Rc<RefCell<HashMap<String, FontState>>>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, family: &str) -> Option<FontState> {
        self.states.borrow().get(family).cloned()
    }

    /// Requests `font` through `loader` unless it was requested before.
    ///
    /// Returns the state after the call.
    pub fn ensure(&self, font: &FontFace, loader: &dyn FontLoader) -> FontState {
        if let Some(state) = self.state(&font.family) {
            return state;
        }
        self.states
            .borrow_mut()
            .insert(font.family.clone(), FontState::Loading);
        tracing::debug!(family = %font.family, source = %font.source, "requesting font asset");
        loader.request(font);
        // The loader may have reported synchronously.
        self.state(&font.family).unwrap_or(FontState::Loading)
    }

    /// Records the outcome of a load started by [`ensure`](Self::ensure).
    pub fn finish(&self, family: &str, result: Result<(), String>) {
        let state = match result {
            Ok(()) => FontState::Loaded,
            Err(reason) => FontState::Failed(reason),
        };
        self.states.borrow_mut().insert(family.to_string(), state);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every request it receives.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct RecordingLoader {
        pub requests: Rc<RefCell<Vec<String>>>,
    }

    impl FontLoader for RecordingLoader {
        fn request(&self, font: &FontFace) {
            self.requests.borrow_mut().push(font.family.clone());
        }
    }
}
