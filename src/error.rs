//! Error types for editable components and their collaborators.
//!
//! Most failures inside a component's lifecycle never leave the component:
//! they are logged and folded into state (a disabled instance, a fallback
//! image, a `font-load-error` event). The types here surface only where a
//! host explicitly asks for something that can fail on its input, such as
//! parsing a configuration document or decoding uploaded image bytes.

use thiserror::Error;

/// Failure reported by a [`KeyValueStore`](crate::store::KeyValueStore).
#[derive(Debug, Error)]
pub enum StorageError {
    /// The write would exceed the store's capacity.
    #[error("storage quota exceeded writing {key:?} ({needed} bytes needed, {limit} allowed)")]
    Quota {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// The backing file could not be read or written.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document is not a valid JSON object of strings.
    #[error("storage document is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend is busy, e.g. re-entered while handling another call.
    #[error("storage is unavailable")]
    Unavailable,
}

/// Top-level error for the editing framework.
#[derive(Debug, Error)]
pub enum EditableError {
    /// A configuration value was rejected.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The persisted store rejected an operation.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No adoptable node was found in the host subtree.
    #[error("no adoptable {family} element in host content")]
    ContentResolution { family: &'static str },

    /// A font or image asset failed to load.
    #[error("asset {name:?} failed to load: {reason}")]
    AssetLoad { name: String, reason: String },

    /// Every image fallback failed; the node is hidden.
    #[error("image {src:?} and its fallbacks failed to load")]
    RenderFallback { src: String },

    /// Uploaded image bytes could not be decoded or re-encoded.
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    /// A JSON document could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two template fields share an identifier.
    #[error("duplicate field id {0:?}")]
    DuplicateField(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_converts_into_editable_error() {
        let err: EditableError = StorageError::Unavailable.into();
        assert!(matches!(err, EditableError::Storage(StorageError::Unavailable)));
        assert_eq!(err.to_string(), "storage is unavailable");
    }

    #[test]
    fn quota_message_names_the_key() {
        let err = StorageError::Quota {
            key: "vellum-v1-title".into(),
            needed: 12,
            limit: 8,
        };
        assert!(err.to_string().contains("vellum-v1-title"));
    }
}
