//! vellum: stateful editing components for customizable visual templates
//!
//! This crate provides three editable component families (text regions,
//! image slots, and background-color changers) that wrap nodes of a host
//! visual tree. Every component keeps its declarative options synchronized
//! with live state, persists its value across sessions, and emits a uniform
//! event contract.
//!
//! # Example
//!
//! ```
//! use vellum::{EditableOptions, EditableText, EditorContext, Element, NodeHandle};
//!
//! let ctx = EditorContext::default();
//! let node = NodeHandle::new(Element::new("h1").with_content("Welcome"));
//!
//! let mut title = EditableText::new(&ctx, EditableOptions::new().with_max_length(10));
//! title.attach(std::slice::from_ref(&node));
//! assert_eq!(title.value(), "Welcome");
//!
//! // Values are clamped to maxLength.
//! title.set_value("Welcome to the show");
//! assert_eq!(node.borrow().content(), "Welcome to");
//!
//! // Attribute writes are equivalent to typed ones.
//! title.set_attribute("readonly", Some("")).unwrap();
//! assert_eq!(title.attribute("readonly").as_deref(), Some(""));
//! assert!(!title.is_interactive());
//! ```
//!
//! # Persistence
//!
//! Components with an `id` and `persist` read their value from the shared
//! [`PersistedStore`] on attach and write it back on every change:
//!
//! ```
//! use vellum::{
//!     EditableOptions, EditableText, EditorConfig, EditorContext, Element, NodeHandle,
//!     PersistedStore,
//! };
//!
//! let store = PersistedStore::in_memory();
//! let ctx = EditorContext::with_store(EditorConfig::default(), store.clone());
//! let options = EditableOptions::new().with_id("greeting").with_persist(true);
//!
//! let node = NodeHandle::new(Element::new("p"));
//! let mut text = EditableText::new(&ctx, options.clone());
//! text.attach(std::slice::from_ref(&node));
//! text.set_value("Hello");
//! drop(text);
//!
//! let mut reloaded = EditableText::new(&ctx, options);
//! reloaded.attach(std::slice::from_ref(&node));
//! assert_eq!(reloaded.value(), "Hello");
//! assert_eq!(store.get("vellum-v1-greeting").unwrap().as_deref(), Some("Hello"));
//! ```

mod component;
mod config;
mod contrast;
mod error;
mod event;
mod family;
mod node;
mod options;
pub mod richtext;
mod store;
mod template;

pub use component::{
    ConfigStore, Configurable, Core, Editable, Family, FocusState, Key, KeyOutcome, Origin, Phase,
};
pub use config::{
    DEFAULT_IMAGE_FALLBACK, DEFAULT_IMAGE_SECONDARY_FALLBACK, EditorConfig, EditorContext,
};
pub use contrast::{ContrastRegistry, CssColor, contrast_for, contrast_for_css, luminance, to_hex};
pub use error::{EditableError, StorageError};
pub use event::{EditableEvent, LengthDetail};
pub use family::{
    ColorChanger, ColorFamily, EditableImage, EditableText, ImageFamily, ImageStage, TextFamily,
};
pub use node::{Element, NodeHandle, WeakNode};
pub use options::{EditableOptions, Setting};
pub use richtext::{Command, FontCache, FontFace, FontLoader, FontState, FormattingSpan, SpanList};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, PersistedStore};
pub use template::{Field, FieldKind, FieldSpec, TemplateEditor, TemplateSpec, TemplateValues};
