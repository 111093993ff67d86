//! Editable image slots.
//!
//! The value is the image source URI. Load failures step through the
//! fallback chain:
//!
//! ```text
//! Primary ──fail──▶ Fallback ──fail──▶ Secondary ──fail──▶ Hidden
//! ```
//!
//! Any value change starts over at `Primary` (or `Fallback` for an empty
//! value). Captions live in the `alt` option and persist under `<key>-alt`.

use std::io::Cursor;
use std::rc::Rc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use image::imageops::FilterType;

use crate::component::render::paint_affordances;
use crate::component::{ConfigStore, Core, Editable, Family};
use crate::config::{EditorConfig, EditorContext};
use crate::error::EditableError;
use crate::event::EditableEvent;
use crate::node::Element;
use crate::options::{EditableOptions, Setting};

/// Where in the fallback chain the slot currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageStage {
    #[default]
    Primary,
    Fallback,
    Secondary,
    Hidden,
}

impl ImageStage {
    fn next(self) -> Self {
        match self {
            Self::Primary => Self::Fallback,
            Self::Fallback => Self::Secondary,
            Self::Secondary | Self::Hidden => Self::Hidden,
        }
    }
}

/// Image behavior: source painting, the fallback chain, and captions.
#[derive(Debug)]
pub struct ImageFamily {
    config: Rc<EditorConfig>,
    stage: ImageStage,
}

impl ImageFamily {
    pub fn stage(&self) -> ImageStage {
        self.stage
    }

    fn source<'a>(&'a self, state: &'a ConfigStore) -> &'a str {
        let options = state.options();
        match self.stage {
            ImageStage::Primary => state.value(),
            ImageStage::Fallback => options
                .fallback_src
                .as_deref()
                .unwrap_or(&self.config.image_fallback_src),
            ImageStage::Secondary | ImageStage::Hidden => options
                .secondary_fallback_src
                .as_deref()
                .unwrap_or(&self.config.image_secondary_fallback_src),
        }
    }
}

impl Family for ImageFamily {
    const NAME: &'static str = "image";

    fn new(ctx: &EditorContext, _options: &EditableOptions) -> Self {
        Self {
            config: Rc::clone(&ctx.config),
            stage: ImageStage::Fallback,
        }
    }

    fn accepts(&self, el: &Element) -> bool {
        el.tag() == "img"
    }

    fn requires_single(&self, _state: &ConfigStore) -> bool {
        true
    }

    fn seed_from(&self, el: &Element, _state: &ConfigStore) -> Option<String> {
        el.attribute("src").filter(|src| !src.is_empty()).map(str::to_string)
    }

    fn normalize(&self, _state: &ConfigStore, value: String) -> (String, bool) {
        (value.trim().to_string(), false)
    }

    fn value_changed(&mut self, core: &mut Core) {
        self.stage = if core.state().value().is_empty() {
            ImageStage::Fallback
        } else {
            ImageStage::Primary
        };
    }

    fn paint(&mut self, core: &Core, el: &mut Element) {
        let state = core.state();
        let hidden = self.stage == ImageStage::Hidden;
        el.set_attribute("src", Some(self.source(state)));
        el.set_attribute("alt", Some(state.options().alt.as_deref().unwrap_or_default()));
        el.set_attribute("hidden", hidden.then_some(""));
        el.set_attribute("data-load-failed", hidden.then_some(""));
        paint_affordances(core, el);
    }

    fn configure(&mut self, core: &mut Core, setting: &Setting) {
        let persist = core.state().options().persist;
        match setting {
            Setting::Alt(alt) => core.persistence.save_alt(persist, alt),
            Setting::Persist(true) => {
                let alt = core.state().options().alt.clone().unwrap_or_default();
                core.persistence.save_alt(true, &alt);
            }
            _ => {}
        }
    }

    /// Caption precedence matches the value: persisted, declared, adopted.
    fn seeded(&mut self, core: &mut Core, node: Option<&Element>) {
        let persist = core.state().options().persist;
        let persisted = core.persistence.load_alt(persist);
        let adopted = node.and_then(|el| el.attribute("alt")).map(str::to_string);
        let declared = core.state().options().alt.clone();
        if let Some(alt) = persisted.or(declared).or(adopted) {
            core.state.options_mut().alt = Some(alt);
        }
    }
}

impl Editable<ImageFamily> {
    pub fn stage(&self) -> ImageStage {
        self.family.stage()
    }

    /// The host failed to load the current source. Advances the fallback
    /// chain and repaints.
    pub fn report_load_error(&mut self) {
        if !self.core.lifecycle.is_ready() {
            return;
        }
        let stage = self.family.stage;
        let next = stage.next();
        if next == stage {
            return;
        }
        let failed = self.family.source(self.core.state()).to_string();
        self.family.stage = next;
        if next == ImageStage::Hidden {
            let error = EditableError::RenderFallback { src: self.value().to_string() };
            tracing::warn!(id = ?self.id(), %error, "hiding image");
        } else {
            tracing::warn!(
                id = ?self.id(),
                src = %failed,
                ?next,
                "image failed to load; using fallback"
            );
        }
        self.render();
    }

    /// Sets the caption.
    pub fn set_alt(&mut self, alt: impl Into<String>) {
        self.set(Setting::Alt(alt.into()));
    }

    pub fn alt(&self) -> &str {
        self.options().alt.as_deref().unwrap_or_default()
    }

    /// Replaces the image with uploaded bytes, embedded as a PNG data URI.
    ///
    /// Images larger than the configured maximum dimension are downscaled.
    /// Emits `input` and `change` like a completed edit.
    pub fn replace_with_bytes(&mut self, bytes: &[u8]) -> Result<(), EditableError> {
        if !self.is_interactive() {
            return Err(EditableError::Configuration(
                "image slot is not interactive".to_string(),
            ));
        }
        let uri = encode_data_uri(bytes, self.core.context().config.max_embedded_image_dimension)?;
        let before = self.value().to_string();
        self.set_value_ready(uri);

        let value = self.value().to_string();
        self.core.emit(EditableEvent::Input { value: value.clone() });
        if value != before {
            self.core.emit(EditableEvent::Change { value });
        }
        Ok(())
    }
}

/// Decodes, bounds, and re-encodes an image as a `data:image/png;base64,` URI.
pub(crate) fn encode_data_uri(bytes: &[u8], max_dimension: u32) -> Result<String, EditableError> {
    let mut img = image::load_from_memory(bytes)?;
    if img.width() > max_dimension || img.height() > max_dimension {
        img = img.resize(max_dimension, max_dimension, FilterType::Triangle);
    }

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::DEFAULT_IMAGE_FALLBACK;
    use crate::family::EditableImage;
    use crate::node::NodeHandle;
    use crate::store::PersistedStore;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn attached(ctx: &EditorContext, options: EditableOptions, node: &NodeHandle) -> EditableImage {
        let mut image = EditableImage::new(ctx, options);
        image.attach(std::slice::from_ref(node));
        image.drain_events();
        image
    }

    #[test]
    fn adopts_existing_source_and_alt() {
        let ctx = EditorContext::default();
        let node = NodeHandle::new(
            Element::new("img")
                .with_attribute("src", "photos/cat.jpg")
                .with_attribute("alt", "A cat"),
        );
        let image = attached(&ctx, EditableOptions::new(), &node);

        assert_eq!(image.value(), "photos/cat.jpg");
        assert_eq!(image.alt(), "A cat");
        assert_eq!(image.stage(), ImageStage::Primary);
    }

    #[test]
    fn requires_a_single_img() {
        let ctx = EditorContext::default();
        let mut image = EditableImage::new(&ctx, EditableOptions::new());
        let a = NodeHandle::new(Element::new("img"));
        let b = NodeHandle::new(Element::new("img"));
        image.attach(&[a, b]);
        assert_eq!(image.drain_events(), vec![EditableEvent::SlottedElementMissing]);

        let mut wrong = EditableImage::new(&ctx, EditableOptions::new());
        wrong.attach(&[NodeHandle::new(Element::new("div"))]);
        assert!(wrong.node().is_none());
    }

    #[test]
    fn fallback_chain_ends_hidden() {
        let ctx = EditorContext::default();
        let node = NodeHandle::new(Element::new("img"));
        let mut options = EditableOptions::new().with_value("missing.png");
        options.secondary_fallback_src = Some("backup.png".into());
        let mut image = attached(&ctx, options, &node);

        assert_eq!(node.borrow().attribute("src"), Some("missing.png"));
        image.report_load_error();
        assert_eq!(node.borrow().attribute("src"), Some(DEFAULT_IMAGE_FALLBACK));
        image.report_load_error();
        assert_eq!(node.borrow().attribute("src"), Some("backup.png"));
        assert!(!node.borrow().has_attribute("hidden"));
        image.report_load_error();
        assert_eq!(image.stage(), ImageStage::Hidden);
        assert!(node.borrow().has_attribute("hidden"));
        assert!(node.borrow().has_attribute("data-load-failed"));

        image.set_value("fresh.png");
        assert_eq!(image.stage(), ImageStage::Primary);
        assert!(!node.borrow().has_attribute("hidden"));
        assert_eq!(node.borrow().attribute("src"), Some("fresh.png"));
    }

    #[test]
    fn empty_value_shows_fallback() {
        let ctx = EditorContext::default();
        let node = NodeHandle::new(Element::new("img"));
        let image = attached(&ctx, EditableOptions::new(), &node);
        assert_eq!(image.stage(), ImageStage::Fallback);
        assert_eq!(node.borrow().attribute("src"), Some(DEFAULT_IMAGE_FALLBACK));
    }

    #[test]
    fn caption_persists_under_alt_key() {
        let store = PersistedStore::in_memory();
        let ctx = EditorContext::with_store(EditorConfig::default(), store.clone());
        let options = EditableOptions::new().with_id("hero").with_persist(true);

        let node = NodeHandle::new(Element::new("img"));
        let mut image = attached(&ctx, options.clone(), &node);
        image.set_value("hero.png");
        image.set_alt("Our team");
        assert_eq!(store.get("vellum-v1-hero-alt").unwrap().as_deref(), Some("Our team"));
        drop(image);

        let fresh = NodeHandle::new(Element::new("img"));
        let reloaded = attached(&ctx, options, &fresh);
        assert_eq!(reloaded.value(), "hero.png");
        assert_eq!(reloaded.alt(), "Our team");
        assert_eq!(fresh.borrow().attribute("alt"), Some("Our team"));
    }

    #[test]
    fn uploaded_bytes_become_bounded_png() {
        let mut config = EditorConfig::default();
        config.max_embedded_image_dimension = 8;
        let ctx = EditorContext::new(config);
        let node = NodeHandle::new(Element::new("img"));
        let mut image = attached(&ctx, EditableOptions::new().with_value("old.png"), &node);

        image.replace_with_bytes(&png_bytes(32, 16)).unwrap();
        let uri = image.value().to_string();
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        let decoded = image::load_from_memory(&STANDARD.decode(payload).unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 4));

        let names: Vec<_> = image.drain_events().iter().map(EditableEvent::name).collect();
        assert_eq!(names, ["input", "change"]);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let ctx = EditorContext::default();
        let node = NodeHandle::new(Element::new("img"));
        let mut image = attached(&ctx, EditableOptions::new().with_value("keep.png"), &node);

        assert!(matches!(image.replace_with_bytes(b"not an image"), Err(EditableError::Image(_))));
        assert_eq!(image.value(), "keep.png");
    }
}
