//! Template-level orchestration of editable fields.
//!
//! A [`TemplateSpec`] lists the fields a template exposes. [`TemplateEditor`]
//! builds one component per field, attaches them to host content, and moves
//! field values in and out as a serializable [`TemplateValues`] snapshot.
//!
//! # Example
//!
//! ```
//! use vellum::{EditorContext, Element, NodeHandle, TemplateEditor, TemplateSpec};
//!
//! let spec = TemplateSpec::from_json(r##"{
//!     "name": "business-card",
//!     "fields": [
//!         { "id": "name", "label": "Name", "kind": "text", "default": "Jane Doe" },
//!         { "id": "accent", "label": "Accent", "kind": "color", "default": "#1d3557" }
//!     ]
//! }"##).unwrap();
//!
//! let ctx = EditorContext::default();
//! let mut editor = TemplateEditor::from_spec(spec, &ctx).unwrap();
//!
//! let name = NodeHandle::new(Element::new("h1"));
//! let accent = NodeHandle::new(Element::new("section"));
//! editor.attach_all(|id| match id {
//!     "name" => vec![name.clone()],
//!     _ => vec![accent.clone()],
//! });
//!
//! assert_eq!(name.borrow().content(), "Jane Doe");
//! assert_eq!(ctx.contrast.get_hex("accent").as_deref(), Some("#FFFFFF"));
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::component::{Configurable, Phase};
use crate::config::EditorContext;
use crate::error::EditableError;
use crate::event::EditableEvent;
use crate::family::{ColorChanger, EditableImage, EditableText};
use crate::node::NodeHandle;
use crate::options::{EditableOptions, Setting};

// ============================================================================
// Template Description
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Image,
    Color,
}

/// One editable field of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,

    /// Initial value when nothing is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Extra component options. `id` and `value` are filled from the field.
    #[serde(default)]
    pub options: EditableOptions,
}

impl FieldSpec {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            default: None,
            options: EditableOptions::default(),
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_options(mut self, options: EditableOptions) -> Self {
        self.options = options;
        self
    }
}

/// A template's field list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpec {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl TemplateSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, EditableError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, EditableError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Snapshot of every field value, keyed by field id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateValues {
    pub template: String,
    pub values: BTreeMap<String, String>,
}

impl TemplateValues {
    pub fn from_json(json: &str) -> Result<Self, EditableError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, EditableError> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Field
// ============================================================================

/// A live component of any family.
pub enum Field {
    Text(EditableText),
    Image(EditableImage),
    Color(ColorChanger),
}

macro_rules! each_family {
    ($field:expr, $inner:ident => $body:expr) => {
        match $field {
            Field::Text($inner) => $body,
            Field::Image($inner) => $body,
            Field::Color($inner) => $body,
        }
    };
}

impl Field {
    fn build(kind: FieldKind, ctx: &EditorContext, options: EditableOptions) -> Self {
        match kind {
            FieldKind::Text => Self::Text(EditableText::new(ctx, options)),
            FieldKind::Image => Self::Image(EditableImage::new(ctx, options)),
            FieldKind::Color => Self::Color(ColorChanger::new(ctx, options)),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Image(_) => FieldKind::Image,
            Self::Color(_) => FieldKind::Color,
        }
    }

    pub fn value(&self) -> &str {
        each_family!(self, f => f.value())
    }

    pub fn phase(&self) -> Phase {
        each_family!(self, f => f.phase())
    }

    pub fn set(&mut self, setting: Setting) {
        each_family!(self, f => f.set(setting))
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.set(Setting::Value(value.into()));
    }

    pub fn attach(&mut self, children: &[NodeHandle]) {
        each_family!(self, f => f.attach(children))
    }

    pub fn detach(&mut self) {
        each_family!(self, f => f.detach())
    }

    pub fn drain_events(&mut self) -> Vec<EditableEvent> {
        each_family!(self, f => f.drain_events())
    }

    pub fn as_text_mut(&mut self) -> Option<&mut EditableText> {
        match self {
            Self::Text(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut EditableImage> {
        match self {
            Self::Image(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_color_mut(&mut self) -> Option<&mut ColorChanger> {
        match self {
            Self::Color(f) => Some(f),
            _ => None,
        }
    }
}

impl Configurable for Field {
    fn apply_options(&mut self, options: &EditableOptions) {
        each_family!(self, f => f.apply_options(options))
    }

    fn export_options(&self) -> EditableOptions {
        each_family!(self, f => f.export_options())
    }
}

// ============================================================================
// TemplateEditor
// ============================================================================

/// All editable fields of one template instance.
pub struct TemplateEditor {
    spec: TemplateSpec,
    fields: Vec<Field>,
}

impl TemplateEditor {
    /// Builds one detached component per field.
    ///
    /// Fails with [`EditableError::DuplicateField`] if two fields share an id.
    pub fn from_spec(spec: TemplateSpec, ctx: &EditorContext) -> Result<Self, EditableError> {
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(spec.fields.len());
        for field in &spec.fields {
            if !seen.insert(field.id.as_str()) {
                return Err(EditableError::DuplicateField(field.id.clone()));
            }
            let mut options = field.options.clone();
            options.id = Some(field.id.clone());
            if options.value.is_none() {
                options.value = field.default.clone();
            }
            fields.push(Field::build(field.kind, ctx, options));
        }
        tracing::debug!(template = %spec.name, fields = fields.len(), "template built");
        Ok(Self { spec, fields })
    }

    pub fn spec(&self) -> &TemplateSpec {
        &self.spec
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn index(&self, id: &str) -> Option<usize> {
        self.spec.fields.iter().position(|f| f.id == id)
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.index(id).map(|i| &self.fields[i])
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.index(id).map(|i| &mut self.fields[i])
    }

    pub fn text_mut(&mut self, id: &str) -> Option<&mut EditableText> {
        self.field_mut(id)?.as_text_mut()
    }

    pub fn image_mut(&mut self, id: &str) -> Option<&mut EditableImage> {
        self.field_mut(id)?.as_image_mut()
    }

    pub fn color_mut(&mut self, id: &str) -> Option<&mut ColorChanger> {
        self.field_mut(id)?.as_color_mut()
    }

    /// Iterates fields with their ids, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.spec.fields.iter().map(|f| f.id.as_str()).zip(&self.fields)
    }

    /// Attaches every field to the content `children_of` returns for its id.
    pub fn attach_all(&mut self, mut children_of: impl FnMut(&str) -> Vec<NodeHandle>) {
        for (spec, field) in self.spec.fields.iter().zip(&mut self.fields) {
            field.attach(&children_of(&spec.id));
        }
    }

    pub fn detach_all(&mut self) {
        self.fields.iter_mut().for_each(Field::detach);
    }

    /// Switches every field in or out of export mode.
    pub fn set_preview(&mut self, preview: bool) {
        for field in &mut self.fields {
            field.set(Setting::Preview(preview));
        }
    }

    pub fn export_values(&self) -> TemplateValues {
        TemplateValues {
            template: self.spec.name.clone(),
            values: self
                .iter()
                .map(|(id, field)| (id.to_string(), field.value().to_string()))
                .collect(),
        }
    }

    /// Sets each field named in `values`. Unknown ids are skipped.
    pub fn apply_values(&mut self, values: &TemplateValues) {
        if values.template != self.spec.name {
            tracing::warn!(
                expected = %self.spec.name,
                found = %values.template,
                "applying values from another template"
            );
        }
        for (id, value) in &values.values {
            match self.field_mut(id) {
                Some(field) => field.set_value(value.as_str()),
                None => tracing::debug!(id = %id, "no such field; value skipped"),
            }
        }
    }

    /// Restores every field to its declared default.
    pub fn reset(&mut self) {
        for (spec, field) in self.spec.fields.iter().zip(&mut self.fields) {
            let default = spec.options.value.clone().or_else(|| spec.default.clone());
            field.set_value(default.unwrap_or_default());
        }
    }

    /// Drains every field's events, tagged with the field id.
    pub fn drain_events(&mut self) -> Vec<(String, EditableEvent)> {
        let mut out = Vec::new();
        for (spec, field) in self.spec.fields.iter().zip(&mut self.fields) {
            out.extend(field.drain_events().into_iter().map(|e| (spec.id.clone(), e)));
        }
        out
    }

    /// Forwards a finished font load to every text field.
    pub fn font_load_finished(&mut self, family: &str, result: Result<(), String>) {
        for field in &mut self.fields {
            if let Field::Text(text) = field {
                text.font_load_finished(family, result.clone());
            }
        }
    }
}
