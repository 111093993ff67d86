//! Editor-wide configuration and the shared service context.

use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::contrast::ContrastRegistry;
use crate::richtext::fonts::{FontCache, FontFace, FontLoader, NoopFontLoader};
use crate::store::PersistedStore;

/// Placeholder shown when an image value is empty or fails to load.
pub const DEFAULT_IMAGE_FALLBACK: &str = "assets/image-placeholder.svg";

/// Shown when [`DEFAULT_IMAGE_FALLBACK`] itself fails.
pub const DEFAULT_IMAGE_SECONDARY_FALLBACK: &str = "data:image/gif;base64,R0lGODlhAQABAAAAACw=";

// ============================================================================
// EditorConfig
// ============================================================================

/// Settings shared by every component in an editor session.
///
/// # JSON Format
///
/// ```json
/// {
///   "namespace": "cards",
///   "version": "v2",
///   "blurGraceMs": 150,
///   "fonts": [{ "id": "serif", "family": "Merriweather", "source": "fonts/merriweather.woff2" }]
/// }
/// ```
///
/// Every field is optional in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// First segment of every persisted key.
    pub namespace: String,

    /// Second segment of every persisted key. Bumping it orphans old records.
    pub version: String,

    /// How long a blur waits before committing, to tolerate focus moving
    /// within the same component.
    pub blur_grace_ms: u64,

    /// Image shown when a value is empty or fails to load.
    pub image_fallback_src: String,

    /// Image shown when the fallback itself fails.
    pub image_secondary_fallback_src: String,

    /// Uploaded images larger than this on either side are downscaled.
    pub max_embedded_image_dimension: u32,

    /// Fonts the rich-text toolbar may apply.
    pub fonts: Vec<FontFace>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            namespace: "vellum".to_string(),
            version: "v1".to_string(),
            blur_grace_ms: 100,
            image_fallback_src: DEFAULT_IMAGE_FALLBACK.to_string(),
            image_secondary_fallback_src: DEFAULT_IMAGE_SECONDARY_FALLBACK.to_string(),
            max_embedded_image_dimension: 1600,
            fonts: Vec::new(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a font to the catalog.
    pub fn with_font(mut self, font: FontFace) -> Self {
        self.fonts.push(font);
        self
    }

    /// Sets the persistence namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }

    /// Looks up a font by its catalog id.
    pub fn font(&self, id: &str) -> Option<&FontFace> {
        self.fonts.iter().find(|f| f.id == id)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// EditorContext
// ============================================================================

/// Services injected into every component.
///
/// Cloning is cheap; all clones share the same store, contrast registry,
/// and font cache.
#[derive(Clone)]
pub struct EditorContext {
    pub config: Rc<EditorConfig>,
    pub store: PersistedStore,
    pub contrast: ContrastRegistry,
    pub fonts: FontCache,
    pub font_loader: Rc<dyn FontLoader>,
}

impl EditorContext {
    /// Creates a context with an in-memory store and no font loader.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_store(config, PersistedStore::in_memory())
    }

    pub fn with_store(config: EditorConfig, store: PersistedStore) -> Self {
        Self {
            config: Rc::new(config),
            store,
            contrast: ContrastRegistry::default(),
            fonts: FontCache::default(),
            font_loader: Rc::new(NoopFontLoader),
        }
    }

    /// Replaces the font loader.
    pub fn with_font_loader(mut self, loader: impl FontLoader + 'static) -> Self {
        self.font_loader = Rc::new(loader);
        self
    }
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = EditorConfig::from_json("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.blur_grace(), Duration::from_millis(100));
    }

    #[test]
    fn camel_case_fields_and_font_lookup() {
        let config = EditorConfig::from_json(
            r#"{
                "namespace": "cards",
                "blurGraceMs": 250,
                "fonts": [{ "id": "serif", "family": "Merriweather", "source": "m.woff2" }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.namespace, "cards");
        assert_eq!(config.version, "v1");
        assert_eq!(config.blur_grace_ms, 250);
        assert_eq!(config.font("serif").unwrap().family, "Merriweather");
        assert!(config.font("mono").is_none());
    }
}
