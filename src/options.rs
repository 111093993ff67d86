//! Declarative configuration surface shared by all component families.
//!
//! [`EditableOptions`] is the serializable form a template registry hands to
//! a component. [`Setting`] is the closed set of single-option writes; both
//! the typed setters and the string attribute surface funnel into it, which
//! is what keeps the two surfaces in agreement.
//!
//! # Example
//!
//! ```
//! use vellum::{EditableOptions, Setting};
//!
//! let options = EditableOptions::from_json(
//!     r#"{ "id": "title", "persist": true, "maxLength": 40, "placeholder": "Your title" }"#,
//! )
//! .unwrap();
//! assert_eq!(options.max_length, Some(40));
//!
//! let setting = Setting::from_attribute("readonly", Some("")).unwrap();
//! assert_eq!(setting, Setting::ReadOnly(true));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::EditableError;

// ============================================================================
// EditableOptions
// ============================================================================

/// Declared configuration for one component instance.
///
/// # JSON Format
///
/// ```json
/// {
///   "id": "headline",
///   "value": "Happy Birthday",
///   "placeholder": "Type a headline",
///   "maxLength": 40,
///   "persist": true,
///   "toolbar": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct EditableOptions {
    /// Instance identifier; required for persistence and contrast publication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Declared initial value. A persisted value takes precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Shown while the value is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Maximum length in chars. Ignored in toolbar mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    pub read_only: bool,
    pub disabled: bool,

    /// Non-edit rendering for export: no editing affordances.
    pub preview: bool,

    /// Styling hint only.
    pub highlight: bool,

    /// Persist the value under the instance's key.
    pub persist: bool,

    /// Rich-text mode (text family).
    pub toolbar: bool,

    /// Follow a published contrast color instead of a picked one (color family).
    pub auto_color: bool,

    /// Overrides the derived persistence key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,

    /// Caption (image family), persisted under `<key>-alt`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    /// Overrides the editor's image fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_src: Option<String>,

    /// Overrides the editor's secondary image fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_fallback_src: Option<String>,

    /// Id whose published contrast an `autoColor` instance follows.
    /// Defaults to the instance's own id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast_from: Option<String>,
}

impl EditableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn with_toolbar(mut self, toolbar: bool) -> Self {
        self.toolbar = toolbar;
        self
    }

    pub fn with_auto_color(mut self, auto_color: bool) -> Self {
        self.auto_color = auto_color;
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    /// Applies one setting. Returns true if the options changed.
    ///
    /// `Setting::Value` replaces the declared value.
    pub fn apply(&mut self, setting: &Setting) -> bool {
        fn replace<T: PartialEq + Clone>(slot: &mut T, new: &T) -> bool {
            if slot == new {
                false
            } else {
                *slot = new.clone();
                true
            }
        }

        match setting {
            Setting::Value(v) => replace(&mut self.value, &Some(v.clone())),
            Setting::Placeholder(v) => replace(&mut self.placeholder, v),
            Setting::MaxLength(v) => replace(&mut self.max_length, v),
            Setting::ReadOnly(v) => replace(&mut self.read_only, v),
            Setting::Disabled(v) => replace(&mut self.disabled, v),
            Setting::Preview(v) => replace(&mut self.preview, v),
            Setting::Highlight(v) => replace(&mut self.highlight, v),
            Setting::Persist(v) => replace(&mut self.persist, v),
            Setting::Toolbar(v) => replace(&mut self.toolbar, v),
            Setting::AutoColor(v) => replace(&mut self.auto_color, v),
            Setting::Id(v) => replace(&mut self.id, v),
            Setting::StorageKey(v) => replace(&mut self.storage_key, v),
            Setting::Alt(v) => replace(&mut self.alt, &Some(v.clone())),
            Setting::FallbackSrc(v) => replace(&mut self.fallback_src, v),
            Setting::SecondaryFallbackSrc(v) => replace(&mut self.secondary_fallback_src, v),
            Setting::ContrastFrom(v) => replace(&mut self.contrast_from, v),
        }
    }

    /// Every option as a setting, flags first and value last.
    pub fn settings(&self) -> Vec<Setting> {
        let mut out = vec![
            Setting::Id(self.id.clone()),
            Setting::StorageKey(self.storage_key.clone()),
            Setting::Placeholder(self.placeholder.clone()),
            Setting::MaxLength(self.max_length),
            Setting::ReadOnly(self.read_only),
            Setting::Disabled(self.disabled),
            Setting::Preview(self.preview),
            Setting::Highlight(self.highlight),
            Setting::Toolbar(self.toolbar),
            Setting::AutoColor(self.auto_color),
            Setting::FallbackSrc(self.fallback_src.clone()),
            Setting::SecondaryFallbackSrc(self.secondary_fallback_src.clone()),
            Setting::ContrastFrom(self.contrast_from.clone()),
            Setting::Persist(self.persist),
        ];
        if let Some(alt) = &self.alt {
            out.push(Setting::Alt(alt.clone()));
        }
        if let Some(value) = &self.value {
            out.push(Setting::Value(value.clone()));
        }
        out
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// Setting
// ============================================================================

/// A single option write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    Value(String),
    Placeholder(Option<String>),
    MaxLength(Option<usize>),
    ReadOnly(bool),
    Disabled(bool),
    Preview(bool),
    Highlight(bool),
    Persist(bool),
    Toolbar(bool),
    AutoColor(bool),
    Id(Option<String>),
    StorageKey(Option<String>),
    Alt(String),
    FallbackSrc(Option<String>),
    SecondaryFallbackSrc(Option<String>),
    ContrastFrom(Option<String>),
}

impl Setting {
    /// Parses an attribute write. `None` means the attribute was removed.
    ///
    /// Boolean attributes are true when present, unless spelled `"false"`.
    pub fn from_attribute(name: &str, value: Option<&str>) -> Result<Self, EditableError> {
        let flag = value.is_some_and(|v| !v.eq_ignore_ascii_case("false"));
        let text = || value.map(str::to_string);
        let non_empty = || value.filter(|v| !v.is_empty()).map(str::to_string);

        let setting = match name.to_ascii_lowercase().as_str() {
            "value" => Self::Value(value.unwrap_or_default().to_string()),
            "placeholder" => Self::Placeholder(non_empty()),
            "maxlength" | "max-length" => Self::MaxLength(match value.map(str::trim) {
                None | Some("") => None,
                Some(raw) => Some(raw.parse().map_err(|_| {
                    EditableError::Configuration(format!(
                        "maxLength must be a non-negative integer, got {raw:?}"
                    ))
                })?),
            }),
            "readonly" | "read-only" => Self::ReadOnly(flag),
            "disabled" => Self::Disabled(flag),
            "preview" => Self::Preview(flag),
            "highlight" => Self::Highlight(flag),
            "persist" => Self::Persist(flag),
            "toolbar" => Self::Toolbar(flag),
            "autocolor" | "auto-color" => Self::AutoColor(flag),
            "id" => Self::Id(non_empty()),
            "storagekey" | "storage-key" => Self::StorageKey(non_empty()),
            "alt" => Self::Alt(text().unwrap_or_default()),
            "fallbacksrc" | "fallback-src" => Self::FallbackSrc(non_empty()),
            "secondaryfallbacksrc" | "secondary-fallback-src" => {
                Self::SecondaryFallbackSrc(non_empty())
            }
            "contrastfrom" | "contrast-from" => Self::ContrastFrom(non_empty()),
            other => {
                return Err(EditableError::Configuration(format!("unknown option {other:?}")));
            }
        };
        Ok(setting)
    }

    /// The canonical attribute name this setting reflects to.
    pub fn attribute_name(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Placeholder(_) => "placeholder",
            Self::MaxLength(_) => "maxlength",
            Self::ReadOnly(_) => "readonly",
            Self::Disabled(_) => "disabled",
            Self::Preview(_) => "preview",
            Self::Highlight(_) => "highlight",
            Self::Persist(_) => "persist",
            Self::Toolbar(_) => "toolbar",
            Self::AutoColor(_) => "auto-color",
            Self::Id(_) => "id",
            Self::StorageKey(_) => "storage-key",
            Self::Alt(_) => "alt",
            Self::FallbackSrc(_) => "fallback-src",
            Self::SecondaryFallbackSrc(_) => "secondary-fallback-src",
            Self::ContrastFrom(_) => "contrast-from",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_round_trip_uses_camel_case() {
        let options = EditableOptions::new()
            .with_id("t1")
            .with_max_length(10)
            .with_persist(true)
            .with_storage_key("custom");
        let json = options.to_json().unwrap();
        assert!(json.contains("\"maxLength\":10"));
        assert!(json.contains("\"storageKey\":\"custom\""));
        assert!(json.contains("\"readOnly\":false"));
        assert_eq!(EditableOptions::from_json(&json).unwrap(), options);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(EditableOptions::from_json("{}").unwrap(), EditableOptions::default());
    }

    #[test]
    fn boolean_attributes() {
        assert_eq!(Setting::from_attribute("persist", Some("")).unwrap(), Setting::Persist(true));
        assert_eq!(
            Setting::from_attribute("persist", Some("FALSE")).unwrap(),
            Setting::Persist(false)
        );
        assert_eq!(Setting::from_attribute("disabled", None).unwrap(), Setting::Disabled(false));
        assert_eq!(
            Setting::from_attribute("autoColor", Some("1")).unwrap(),
            Setting::AutoColor(true)
        );
    }

    #[test]
    fn max_length_attribute_parsing() {
        assert_eq!(
            Setting::from_attribute("maxlength", Some("12")).unwrap(),
            Setting::MaxLength(Some(12))
        );
        assert_eq!(
            Setting::from_attribute("maxLength", Some("")).unwrap(),
            Setting::MaxLength(None)
        );
        assert!(matches!(
            Setting::from_attribute("maxlength", Some("-3")),
            Err(EditableError::Configuration(_))
        ));
    }

    #[test]
    fn unknown_attribute_is_a_configuration_error() {
        assert!(Setting::from_attribute("colour", Some("red")).is_err());
    }

    #[test]
    fn apply_reports_changes() {
        let mut options = EditableOptions::new();
        assert!(options.apply(&Setting::Toolbar(true)));
        assert!(!options.apply(&Setting::Toolbar(true)));
        assert!(options.apply(&Setting::Value("x".into())));
        assert_eq!(options.value.as_deref(), Some("x"));
    }

    #[test]
    fn settings_end_with_value() {
        let options = EditableOptions::new().with_value("v").with_persist(true);
        let settings = options.settings();
        assert_eq!(settings.last(), Some(&Setting::Value("v".into())));
        assert!(settings.contains(&Setting::Persist(true)));
    }
}
